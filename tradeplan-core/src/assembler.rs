//! Plan assembler — merges allocation and execution output into the final
//! trade plan, then validates the whole artifact against its schema.
//!
//! Validation failure is fatal for the run: the assembler never emits a
//! partially valid plan.

use crate::domain::{
    Action, PortfolioConstraints, RecommendedAction, TradePlan, UncertaintyBand,
};
use crate::error::PlanError;

/// Floating tolerance for the budget invariants.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Squashed confidence in [0, 1] from signal-to-noise and model quality.
///
/// SNR contributes 60% (saturating at snr = 1.0), model quality 40%.
/// Undefined risk collapses to a floor of 0.1.
pub fn confidence(expected_return: f64, uncertainty: f64, model_quality: f64) -> f64 {
    if !(uncertainty.is_finite() && uncertainty > 0.0) {
        return 0.1;
    }
    let snr = (expected_return.abs() / uncertainty).clamp(0.0, 1.0);
    (0.4 * model_quality + 0.6 * snr).clamp(0.0, 1.0)
}

/// Parametric P10/P50/P90 band around the expected return.
///
/// `uncertainty` is already horizon-scaled by the supplier, so the band
/// is `expected_return ± 1.2816 * uncertainty`. An unusable uncertainty
/// collapses the band to the point estimate rather than fabricating one.
pub fn uncertainty_band(expected_return: f64, uncertainty: f64) -> UncertaintyBand {
    if !(uncertainty.is_finite() && uncertainty > 0.0) {
        return UncertaintyBand {
            p10: expected_return,
            p50: expected_return,
            p90: expected_return,
        };
    }
    // 1.2816 is the standard normal 90th-percentile z-score.
    let scale = 1.2816 * uncertainty;
    UncertaintyBand {
        p10: expected_return - scale,
        p50: expected_return,
        p90: expected_return + scale,
    }
}

/// Assemble and validate the terminal plan.
///
/// `constraints` are needed to check the cap and cash-floor invariants
/// against the same values the allocator used.
pub fn assemble(
    horizon_days: u32,
    actions: Vec<RecommendedAction>,
    cash_weight: f64,
    notes: String,
    constraints: &PortfolioConstraints,
) -> Result<TradePlan, PlanError> {
    let plan = TradePlan {
        horizon_days,
        recommended_actions: actions,
        cash_weight,
        notes,
    };
    let errors = validate(&plan, constraints);
    if errors.is_empty() {
        Ok(plan)
    } else {
        Err(PlanError::Validation(errors))
    }
}

/// Check every numeric field of the plan against its documented bound.
/// Returns all violations, not just the first.
pub fn validate(plan: &TradePlan, constraints: &PortfolioConstraints) -> Vec<String> {
    let mut errors = Vec::new();

    if !(1..=365).contains(&plan.horizon_days) {
        errors.push(format!(
            "horizon_days out of range [1, 365]: {}",
            plan.horizon_days
        ));
    }
    if !plan.cash_weight.is_finite()
        || plan.cash_weight < -WEIGHT_TOLERANCE
        || plan.cash_weight > 1.0 + WEIGHT_TOLERANCE
    {
        errors.push(format!("cash_weight out of [0, 1]: {}", plan.cash_weight));
    }
    if plan.cash_weight < constraints.min_cash_weight - WEIGHT_TOLERANCE {
        errors.push(format!(
            "cash_weight {} below min_cash_weight {}",
            plan.cash_weight, constraints.min_cash_weight
        ));
    }

    let mut seen = std::collections::BTreeSet::new();
    let mut invested = 0.0;
    for a in &plan.recommended_actions {
        let sym = a.symbol.as_str();
        if sym.trim().is_empty() {
            errors.push("action with empty symbol".into());
        }
        if !seen.insert(sym) {
            errors.push(format!("duplicate action symbol '{sym}'"));
        }
        if !a.target_weight.is_finite()
            || a.target_weight < -WEIGHT_TOLERANCE
            || a.target_weight > 1.0 + WEIGHT_TOLERANCE
        {
            errors.push(format!("{sym}: target_weight out of [0, 1]: {}", a.target_weight));
        }
        if a.target_weight > constraints.max_weight_per_symbol + WEIGHT_TOLERANCE {
            errors.push(format!(
                "{sym}: target_weight {} exceeds max_weight_per_symbol {}",
                a.target_weight, constraints.max_weight_per_symbol
            ));
        }
        if !(0.0..=1.0).contains(&a.confidence) || !a.confidence.is_finite() {
            errors.push(format!("{sym}: confidence out of [0, 1]: {}", a.confidence));
        }
        if !a.expected_return.is_finite() {
            errors.push(format!("{sym}: expected_return is not finite"));
        }
        if !(0.0..=0.05).contains(&a.risk_controls.max_loss_pct_portfolio) {
            errors.push(format!(
                "{sym}: max_loss_pct_portfolio out of [0, 0.05]: {}",
                a.risk_controls.max_loss_pct_portfolio
            ));
        }

        let b = &a.uncertainty_band;
        if !(b.p10.is_finite() && b.p50.is_finite() && b.p90.is_finite()) {
            errors.push(format!("{sym}: uncertainty_band contains non-finite values"));
        } else if !(b.p10 <= b.p50 && b.p50 <= b.p90) {
            errors.push(format!(
                "{sym}: uncertainty_band not ordered: p10={} p50={} p90={}",
                b.p10, b.p50, b.p90
            ));
        }

        if let Some(ladder) = &a.order_plan.ladder {
            let size_sum: f64 = ladder.iter().map(|s| s.size_pct_of_symbol).sum();
            if (size_sum - 1.0).abs() > WEIGHT_TOLERANCE {
                errors.push(format!("{sym}: ladder sizes sum to {size_sum}, expected 1.0"));
            }
            for step in ladder {
                if !(0.0..=1.0).contains(&step.size_pct_of_symbol) {
                    errors.push(format!(
                        "{sym}: ladder step size out of [0, 1]: {}",
                        step.size_pct_of_symbol
                    ));
                }
            }
        }

        // Sells release capital; only buy/hold weights consume budget.
        if a.action != Action::Sell {
            invested += a.target_weight;
        } else if a.target_weight != 0.0 {
            errors.push(format!(
                "{sym}: sell action must carry target_weight 0, got {}",
                a.target_weight
            ));
        }
    }

    let budget = invested + plan.cash_weight;
    if (budget - 1.0).abs() > WEIGHT_TOLERANCE {
        errors.push(format!(
            "weights + cash_weight must equal 1 within {WEIGHT_TOLERANCE}: got {budget}"
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderPlan, OrderType, RiskControls, RiskProfile, TimeInForce};

    fn action(symbol: &str, weight: f64) -> RecommendedAction {
        RecommendedAction {
            symbol: symbol.into(),
            action: Action::Buy,
            target_weight: weight,
            confidence: 0.6,
            expected_return: 0.02,
            uncertainty_band: uncertainty_band(0.02, 0.03),
            order_plan: OrderPlan {
                order_type: OrderType::Limit,
                entry_rule: "BUY via LIMIT".into(),
                ladder: None,
                time_in_force: TimeInForce::Day,
            },
            risk_controls: RiskControls {
                stop_loss_rule: "StopLoss".into(),
                take_profit_rule: "TakeProfit".into(),
                max_loss_pct_portfolio: 0.01,
            },
            evidence: vec![],
            invalidation: vec![],
        }
    }

    fn constraints() -> PortfolioConstraints {
        PortfolioConstraints {
            top_n: 5,
            max_weight_per_symbol: 0.5,
            min_cash_weight: 0.0,
            risk_profile: RiskProfile::Moderate,
        }
    }

    #[test]
    fn valid_plan_assembles() {
        let plan = assemble(
            5,
            vec![action("FPT", 0.5), action("VCB", 0.3)],
            0.2,
            "notes".into(),
            &constraints(),
        );
        assert!(plan.is_ok());
    }

    #[test]
    fn budget_violation_is_fatal() {
        let err = assemble(5, vec![action("FPT", 0.5)], 0.2, String::new(), &constraints());
        match err {
            Err(PlanError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("must equal 1")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn cap_violation_reported_per_symbol() {
        let err = assemble(5, vec![action("FPT", 0.8)], 0.2, String::new(), &constraints());
        match err {
            Err(PlanError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("exceeds max_weight_per_symbol")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn sell_with_nonzero_weight_rejected() {
        let mut a = action("FPT", 0.1);
        a.action = Action::Sell;
        let errors = validate(
            &TradePlan {
                horizon_days: 5,
                recommended_actions: vec![a],
                cash_weight: 1.0,
                notes: String::new(),
            },
            &constraints(),
        );
        assert!(errors.iter().any(|e| e.contains("sell action")));
    }

    #[test]
    fn confidence_is_bounded_and_monotone_in_snr() {
        let low = confidence(0.01, 0.05, 0.7); // snr 0.2
        let high = confidence(0.04, 0.05, 0.7); // snr 0.8
        assert!(low < high);
        assert!((0.0..=1.0).contains(&low));
        assert!((0.0..=1.0).contains(&high));
        // Saturates at snr = 1.
        assert_eq!(confidence(1.0, 0.05, 0.7), confidence(2.0, 0.05, 0.7));
    }

    #[test]
    fn confidence_floor_for_undefined_risk() {
        assert_eq!(confidence(0.05, 0.0, 0.9), 0.1);
    }

    #[test]
    fn band_is_symmetric_and_ordered() {
        let b = uncertainty_band(0.02, 0.05);
        assert_eq!(b.p50, 0.02);
        assert!((b.p90 - b.p50 - (b.p50 - b.p10)).abs() < 1e-12);
        assert!(b.p10 <= b.p50 && b.p50 <= b.p90);
    }

    #[test]
    fn band_degenerates_without_uncertainty() {
        let b = uncertainty_band(0.02, f64::NAN);
        assert_eq!((b.p10, b.p50, b.p90), (0.02, 0.02, 0.02));
    }

    #[test]
    fn bounds_absorb_final_bit_residue() {
        // Weight sums carry double-precision residue; bounds use the
        // same tolerance as the budget checks rather than strict [0, 1].
        let errors = validate(
            &TradePlan {
                horizon_days: 5,
                recommended_actions: vec![action("FPT", 0.5), action("VCB", 0.5)],
                cash_weight: -2.220_446_049_250_313e-16,
                notes: String::new(),
            },
            &constraints(),
        );
        assert!(errors.is_empty(), "unexpected: {errors:?}");
    }

    #[test]
    fn all_violations_are_collected() {
        let mut a = action("FPT", 1.5);
        a.confidence = 2.0;
        let errors = validate(
            &TradePlan {
                horizon_days: 0,
                recommended_actions: vec![a],
                cash_weight: -0.5,
                notes: String::new(),
            },
            &constraints(),
        );
        assert!(errors.len() >= 4, "expected several violations: {errors:?}");
    }
}
