//! Execution planner — entry rules, ladders, stops, and targets.
//!
//! Default entry is a plain limit near the reference price. When the
//! slippage proxy says microstructure is poor, the entry becomes a
//! front-loaded 3-step limit ladder below the anchor. Stop-loss and
//! take-profit distances are ATR multiples selected by risk profile.
//!
//! Fail-closed rule: when ATR is zero or missing, the planner emits
//! textual "atr unavailable" rules instead of computing a degenerate
//! stop at the entry price.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Action, Candidate, LadderStep, OrderPlan, OrderType, RiskControls, RiskProfile, TimeInForce,
};

/// Execution-rule knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Slippage-proxy threshold above which entries are laddered.
    pub ladder_spread_threshold: f64,
    pub time_in_force: TimeInForce,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            ladder_spread_threshold: 0.0025,
            time_in_force: TimeInForce::Day,
        }
    }
}

/// Per-profile risk parameters: stop multiple, target multiple, and the
/// single-position portfolio loss budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileParams {
    pub k_sl: f64,
    pub k_tp: f64,
    pub max_loss_pct_portfolio: f64,
}

impl ProfileParams {
    pub fn for_profile(profile: RiskProfile) -> Self {
        match profile {
            RiskProfile::Conservative => Self {
                k_sl: 1.0,
                k_tp: 1.5,
                max_loss_pct_portfolio: 0.005,
            },
            RiskProfile::Moderate => Self {
                k_sl: 1.2,
                k_tp: 2.0,
                max_loss_pct_portfolio: 0.010,
            },
            RiskProfile::Aggressive => Self {
                k_sl: 1.5,
                k_tp: 2.5,
                max_loss_pct_portfolio: 0.015,
            },
        }
    }
}

/// Slippage proxy in the absence of an order book: higher volatility and
/// lower liquidity both worsen it. Infinite when liquidity is unusable,
/// which forces the laddered entry.
pub fn spread_proxy(uncertainty: f64, liquidity: f64) -> f64 {
    let vol = if uncertainty.is_finite() { uncertainty.max(0.0) } else { 0.0 };
    if !(liquidity.is_finite() && liquidity > 0.0) {
        return f64::INFINITY;
    }
    vol / liquidity.sqrt()
}

/// Complete execution plan for one symbol: entry + risk controls.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    pub order_plan: OrderPlan,
    pub risk_controls: RiskControls,
}

/// Synthesize the execution plan for one recommended action.
pub fn plan_execution(
    candidate: &Candidate,
    action: Action,
    profile: RiskProfile,
    cfg: &ExecutionConfig,
) -> ExecutionPlan {
    let proxy = spread_proxy(candidate.uncertainty, candidate.liquidity);
    ExecutionPlan {
        order_plan: build_order_plan(candidate.last_close, action, proxy, cfg),
        risk_controls: build_risk_controls(candidate.last_close, candidate.atr, action, profile),
    }
}

/// Entry plan: plain limit, or limit + ladder under a poor slippage proxy.
pub fn build_order_plan(
    last_close: f64,
    action: Action,
    spread_proxy: f64,
    cfg: &ExecutionConfig,
) -> OrderPlan {
    if action == Action::Hold {
        return OrderPlan {
            order_type: OrderType::Limit,
            entry_rule: format!("HOLD: no new entry. Reference last_close={last_close:.2}."),
            ladder: None,
            time_in_force: cfg.time_in_force,
        };
    }

    if spread_proxy >= cfg.ladder_spread_threshold {
        // Front-loaded split: most size near the anchor where fills are
        // likeliest, tapering into the deeper steps.
        let ladder = vec![
            LadderStep {
                step_pct: -0.20,
                size_pct_of_symbol: 0.40,
            },
            LadderStep {
                step_pct: -0.50,
                size_pct_of_symbol: 0.35,
            },
            LadderStep {
                step_pct: -1.00,
                size_pct_of_symbol: 0.25,
            },
        ];
        return OrderPlan {
            order_type: OrderType::Limit,
            entry_rule: format!(
                "{} via LIMIT+LADDER: anchor at last_close={last_close:.2}. \
                 Place 3-step ladder below anchor (pct steps), sized by % of symbol allocation.",
                action.tag()
            ),
            ladder: Some(ladder),
            time_in_force: cfg.time_in_force,
        };
    }

    OrderPlan {
        order_type: OrderType::Limit,
        entry_rule: format!(
            "{} via LIMIT: place near last_close={last_close:.2} \
             (consider slight improvement vs last print).",
            action.tag()
        ),
        ladder: None,
        time_in_force: cfg.time_in_force,
    }
}

/// ATR-based stop-loss / take-profit rules, mirrored for sells.
pub fn build_risk_controls(
    entry_reference_price: f64,
    atr: f64,
    action: Action,
    profile: RiskProfile,
) -> RiskControls {
    let p = ProfileParams::for_profile(profile);

    if action == Action::Hold {
        return RiskControls {
            stop_loss_rule: "HOLD: keep existing risk controls; re-evaluate on break of key levels."
                .into(),
            take_profit_rule: "HOLD: consider trimming into strength; re-evaluate on new data."
                .into(),
            max_loss_pct_portfolio: p.max_loss_pct_portfolio,
        };
    }

    if !(atr.is_finite() && atr > 0.0) {
        // Fail closed: no fabricated stop at the entry price.
        return RiskControls {
            stop_loss_rule: format!(
                "{}: stop/target undefined - atr unavailable; use a fixed % stop (profile={}).",
                action.tag(),
                profile.as_str()
            ),
            take_profit_rule: format!(
                "{}: stop/target undefined - atr unavailable; use a fixed % take-profit (profile={}).",
                action.tag(),
                profile.as_str()
            ),
            max_loss_pct_portfolio: p.max_loss_pct_portfolio,
        };
    }

    let (sl, tp) = match action {
        Action::Buy => (
            entry_reference_price - p.k_sl * atr,
            entry_reference_price + p.k_tp * atr,
        ),
        // Mirrored for a sell/short exit.
        _ => (
            entry_reference_price + p.k_sl * atr,
            entry_reference_price - p.k_tp * atr,
        ),
    };
    let side = if action == Action::Buy { "" } else { "for SELL, " };

    RiskControls {
        stop_loss_rule: format!(
            "StopLoss: {side}set at entry {} {:.1}*ATR => ~{sl:.2} (ATR={atr:.2}).",
            if action == Action::Buy { "-" } else { "+" },
            p.k_sl
        ),
        take_profit_rule: format!(
            "TakeProfit: {side}set at entry {} {:.1}*ATR => ~{tp:.2} (ATR={atr:.2}).",
            if action == Action::Buy { "+" } else { "-" },
            p.k_tp
        ),
        max_loss_pct_portfolio: p.max_loss_pct_portfolio,
    }
}
