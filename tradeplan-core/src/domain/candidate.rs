//! Candidate — one symbol's signal inputs at evaluation time.

use serde::{Deserialize, Serialize};

/// Per-symbol inputs to the pipeline, supplied by external collaborators
/// (feature computation, forecast bundle, sentiment aggregation).
///
/// `uncertainty` is the risk denominator for scoring and gating. A value
/// that is zero, negative, or non-finite means the forecast confidence is
/// undefined — the gate treats it as infinite risk, never as zero risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Symbol identifier. Non-empty, unique within a snapshot.
    pub symbol: String,
    /// Signed expected return over the snapshot horizon (fraction).
    pub expected_return: f64,
    /// Dispersion of the forecast over the horizon (e.g. realized vol
    /// or model sigma), already horizon-scaled by the supplier.
    pub uncertainty: f64,
    /// Confidence in the forecast source, in [0, 1].
    pub model_quality: f64,
    /// Liquidity proxy (e.g. 20-day average traded volume).
    pub liquidity: f64,
    /// Average true range, used for stop/target distances.
    pub atr: f64,
    /// Reference price for entry/stop arithmetic (last close).
    pub last_close: f64,
    /// Ordered factual evidence strings. Facts only, no inference.
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl Candidate {
    /// True when `uncertainty` is usable as a risk denominator.
    pub fn has_defined_risk(&self) -> bool {
        self.uncertainty.is_finite() && self.uncertainty > 0.0
    }

    /// Signal-to-noise ratio `|expected_return| / uncertainty`.
    ///
    /// Returns `None` when risk is undefined — callers must exclude,
    /// not substitute a value.
    pub fn signal_to_noise(&self) -> Option<f64> {
        if self.has_defined_risk() {
            Some(self.expected_return.abs() / self.uncertainty)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(uncertainty: f64, expected_return: f64) -> Candidate {
        Candidate {
            symbol: "FPT".into(),
            expected_return,
            uncertainty,
            model_quality: 0.7,
            liquidity: 100_000.0,
            atr: 1.5,
            last_close: 95.0,
            evidence: vec![],
        }
    }

    #[test]
    fn zero_uncertainty_has_no_snr() {
        assert_eq!(make(0.0, 0.05).signal_to_noise(), None);
        assert!(!make(0.0, 0.05).has_defined_risk());
    }

    #[test]
    fn negative_and_nan_uncertainty_are_undefined_risk() {
        assert!(!make(-0.1, 0.05).has_defined_risk());
        assert!(!make(f64::NAN, 0.05).has_defined_risk());
        assert!(!make(f64::INFINITY, 0.05).has_defined_risk());
    }

    #[test]
    fn snr_uses_absolute_return() {
        let snr = make(0.02, -0.04).signal_to_noise().unwrap();
        assert!((snr - 2.0).abs() < 1e-12);
    }
}
