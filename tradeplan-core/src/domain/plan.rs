//! Trade plan — the terminal, immutable artifact of a pipeline run.
//!
//! This is a stable wire format consumed by the presentation layer.
//! Field names and types must not change without versioning.
//!
//! Weights are carried in full double precision through the pipeline and
//! rounded to 4 decimal places only here, at serialization, so rounding
//! error never compounds across the allocation passes.

use serde::{Deserialize, Serialize, Serializer};

/// Recommended per-symbol action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        }
    }

    /// Uppercase tag used inside generated rule text.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

/// Order type for the entry plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Limit,
    Market,
    StopLimit,
}

/// Time-in-force for the entry plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    #[default]
    Day,
    Gtc,
}

/// One step of a laddered limit entry.
///
/// `step_pct` is the price offset in percent vs the anchor price
/// (negative = below anchor). `size_pct_of_symbol` is the share of the
/// symbol's allocation placed at this step; steps sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderStep {
    pub step_pct: f64,
    pub size_pct_of_symbol: f64,
}

/// Entry plan for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlan {
    pub order_type: OrderType,
    pub entry_rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ladder: Option<Vec<LadderStep>>,
    pub time_in_force: TimeInForce,
}

/// Risk controls for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskControls {
    pub stop_loss_rule: String,
    pub take_profit_rule: String,
    /// Worst-case portfolio impact of this single position being
    /// stopped out, independent of its weight. Bounded by [0, 0.05].
    pub max_loss_pct_portfolio: f64,
}

/// P10/P50/P90 band around the expected return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyBand {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// One fully-resolved recommendation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub symbol: String,
    pub action: Action,
    #[serde(serialize_with = "round4")]
    pub target_weight: f64,
    pub confidence: f64,
    pub expected_return: f64,
    pub uncertainty_band: UncertaintyBand,
    pub order_plan: OrderPlan,
    pub risk_controls: RiskControls,
    pub evidence: Vec<String>,
    pub invalidation: Vec<String>,
}

/// The terminal artifact. Created fresh each run, never updated in place;
/// consumers persist it by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub horizon_days: u32,
    pub recommended_actions: Vec<RecommendedAction>,
    #[serde(serialize_with = "round4")]
    pub cash_weight: f64,
    pub notes: String,
}

/// Round a weight to 4 decimal places at serialization only.
fn round4<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 10_000.0).round() / 10_000.0)
}
