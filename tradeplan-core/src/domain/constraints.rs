//! Portfolio constraints and risk profile — immutable per invocation.

use serde::{Deserialize, Serialize};

/// Named risk tier controlling the execution-rule parameter tables
/// (stop/target ATR multiples, per-position portfolio loss budget).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskProfile {
    /// Stable lowercase name, matching the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }

    /// All profiles in canonical order (used by the sweep runner).
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];
}

/// Per-invocation portfolio constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConstraints {
    /// Maximum number of symbols to hold. Must be >= 1.
    pub top_n: usize,
    /// Per-symbol weight cap, in (0, 1].
    pub max_weight_per_symbol: f64,
    /// Minimum cash fraction, in [0, 1].
    pub min_cash_weight: f64,
    /// Risk tier for execution-rule synthesis.
    pub risk_profile: RiskProfile,
}

impl PortfolioConstraints {
    /// Check bounds. Violations are input errors, not recoverable states.
    pub fn check(&self) -> Result<(), String> {
        if self.top_n == 0 {
            return Err("top_n must be >= 1".into());
        }
        if !(self.max_weight_per_symbol > 0.0 && self.max_weight_per_symbol <= 1.0) {
            return Err(format!(
                "max_weight_per_symbol must be in (0, 1], got {}",
                self.max_weight_per_symbol
            ));
        }
        if !(0.0..=1.0).contains(&self.min_cash_weight) || !self.min_cash_weight.is_finite() {
            return Err(format!(
                "min_cash_weight must be in [0, 1], got {}",
                self.min_cash_weight
            ));
        }
        Ok(())
    }
}

impl Default for PortfolioConstraints {
    fn default() -> Self {
        // Defaults mirror the reference portfolio contract.
        Self {
            top_n: 5,
            max_weight_per_symbol: 0.25,
            min_cash_weight: 0.15,
            risk_profile: RiskProfile::Moderate,
        }
    }
}
