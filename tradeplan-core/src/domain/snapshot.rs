//! Signal snapshot — the immutable input to one pipeline invocation.
//!
//! The snapshot replaces the global portfolio/notification state of older
//! designs: everything a run needs is passed in by the caller, and the run
//! returns a fresh plan. No process-wide singletons.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::candidate::Candidate;
use super::constraints::PortfolioConstraints;
use crate::error::PlanError;

/// A currently-held position, supplied by the external portfolio
/// collaborator. The pipeline only consumes it for sell derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldPosition {
    pub symbol: String,
    pub qty: f64,
    pub avg_cost: f64,
}

/// Immutable per-run input: candidates, constraints, held positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    /// Evaluation date of the underlying data.
    pub as_of: NaiveDate,
    /// Forecast horizon in days, in [1, 365].
    pub horizon_days: u32,
    pub candidates: Vec<Candidate>,
    pub constraints: PortfolioConstraints,
    #[serde(default)]
    pub held: Vec<HeldPosition>,
}

impl SignalSnapshot {
    /// Validate snapshot-level invariants. Failures here are fatal
    /// (`PlanError::Input`); per-candidate signal problems are NOT —
    /// those are the gate's job.
    pub fn validate(&self) -> Result<(), PlanError> {
        if !(1..=365).contains(&self.horizon_days) {
            return Err(PlanError::Input(format!(
                "horizon_days must be in [1, 365], got {}",
                self.horizon_days
            )));
        }
        self.constraints.check().map_err(PlanError::Input)?;

        let mut seen = BTreeSet::new();
        for c in &self.candidates {
            if c.symbol.trim().is_empty() {
                return Err(PlanError::Input("candidate with empty symbol".into()));
            }
            if !seen.insert(c.symbol.as_str()) {
                return Err(PlanError::Input(format!(
                    "duplicate candidate symbol '{}'",
                    c.symbol
                )));
            }
            // Structural fields must be finite; signal fields (uncertainty,
            // atr) may be degenerate and are handled downstream.
            for (name, v) in [
                ("expected_return", c.expected_return),
                ("model_quality", c.model_quality),
                ("liquidity", c.liquidity),
                ("last_close", c.last_close),
            ] {
                if !v.is_finite() {
                    return Err(PlanError::Input(format!(
                        "candidate '{}': {} is not finite",
                        c.symbol, name
                    )));
                }
            }
            if !(0.0..=1.0).contains(&c.model_quality) {
                return Err(PlanError::Input(format!(
                    "candidate '{}': model_quality must be in [0, 1], got {}",
                    c.symbol, c.model_quality
                )));
            }
            if c.liquidity < 0.0 {
                return Err(PlanError::Input(format!(
                    "candidate '{}': liquidity must be non-negative, got {}",
                    c.symbol, c.liquidity
                )));
            }
        }
        Ok(())
    }

    /// True if `symbol` appears in the held-position list.
    pub fn is_held(&self, symbol: &str) -> bool {
        self.held.iter().any(|p| p.symbol == symbol)
    }
}
