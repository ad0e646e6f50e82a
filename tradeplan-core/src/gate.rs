//! Gate — admits or excludes candidates before scoring.
//!
//! Three independent rules: liquidity floor, signal-to-noise floor, and
//! model-quality floor. Every failing rule contributes its own reason, so
//! a candidate can be excluded for several reasons at once. The gate is a
//! pure filter: it never reorders or re-scores, and input order is
//! preserved in the output for determinism.

use serde::{Deserialize, Serialize};

use crate::domain::Candidate;

/// Gating thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Minimum liquidity proxy (e.g. 20-day average volume).
    pub min_liquidity: f64,
    /// Minimum `|expected_return| / uncertainty`.
    pub min_signal_to_noise: f64,
    /// Minimum forecast-source quality, in [0, 1].
    pub min_model_quality: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_liquidity: 50_000.0,
            min_signal_to_noise: 0.15,
            min_model_quality: 0.65,
        }
    }
}

/// Outcome for one candidate. Computed once per run, never mutated.
///
/// Invariant: `reasons` is empty iff `admitted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatingDecision {
    pub admitted: bool,
    pub reasons: Vec<String>,
}

/// A candidate paired with its gating decision.
#[derive(Debug, Clone, PartialEq)]
pub struct GatedCandidate {
    pub candidate: Candidate,
    pub decision: GatingDecision,
}

impl GatedCandidate {
    pub fn admitted(&self) -> bool {
        self.decision.admitted
    }
}

/// Apply the gate to every candidate, preserving input order.
///
/// An empty admitted set is a normal outcome, not an error — the
/// downstream allocator returns an all-cash allocation for it.
pub fn gate(candidates: &[Candidate], cfg: &GateConfig) -> Vec<GatedCandidate> {
    candidates
        .iter()
        .map(|c| {
            let mut reasons = Vec::new();

            if c.liquidity < cfg.min_liquidity {
                reasons.push(format!(
                    "low liquidity: {:.0} < {:.0}",
                    c.liquidity, cfg.min_liquidity
                ));
            }

            match c.signal_to_noise() {
                None => {
                    // Zero/negative/non-finite uncertainty means undefined
                    // confidence — treated as infinite risk.
                    reasons.push("undefined risk: uncertainty is not positive".into());
                }
                Some(snr) if snr < cfg.min_signal_to_noise => {
                    reasons.push(format!(
                        "low signal_to_noise: {:.3} < {:.3}",
                        snr, cfg.min_signal_to_noise
                    ));
                }
                Some(_) => {}
            }

            if c.model_quality < cfg.min_model_quality {
                reasons.push(format!(
                    "low model_quality: {:.2} < {:.2}",
                    c.model_quality, cfg.min_model_quality
                ));
            }

            GatedCandidate {
                candidate: c.clone(),
                decision: GatingDecision {
                    admitted: reasons.is_empty(),
                    reasons,
                },
            }
        })
        .collect()
}
