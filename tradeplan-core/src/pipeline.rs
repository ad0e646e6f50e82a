//! Pipeline — wires gate, scorer, allocator, execution planner, and
//! assembler into one synchronous, referentially transparent run.
//!
//! Data flows one way: Snapshot -> Gate -> Scorer -> Allocator ->
//! Execution Planner -> Assembler. No stage mutates a predecessor's
//! output; each returns new, immutable structures. No I/O, no clock
//! reads, no randomness — identical inputs produce byte-identical plans.

use serde::{Deserialize, Serialize};

use crate::allocator::{allocate, Allocation};
use crate::assembler::{assemble, confidence, uncertainty_band};
use crate::domain::{Action, Candidate, RecommendedAction, SignalSnapshot, TradePlan};
use crate::error::PlanError;
use crate::execution::{plan_execution, ExecutionConfig};
use crate::gate::{gate, GateConfig, GatedCandidate};
use crate::narrative::{
    apply_narrative, buy_invalidation, sell_invalidation, NarrativeRenderer, PlanFacts,
    TemplateNarrative, TEMPLATE_NOTES,
};
use crate::scorer::rank;

/// Thresholds and knobs for one pipeline invocation. Constraints live in
/// the snapshot; this carries everything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub gate: GateConfig,
    pub execution: ExecutionConfig,
    /// Expected-return level at or below which a held, unallocated
    /// symbol becomes a sell recommendation.
    pub sell_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gate: GateConfig::default(),
            execution: ExecutionConfig::default(),
            sell_threshold: -0.01,
        }
    }
}

/// Run the full pipeline with the deterministic template narrative.
pub fn run(snapshot: &SignalSnapshot, cfg: &PipelineConfig) -> Result<TradePlan, PlanError> {
    run_with_narrative(snapshot, cfg, &TemplateNarrative)
}

/// Run the full pipeline, letting `renderer` rewrite the text fields of
/// the validated plan. Numeric fields are out of the renderer's reach.
pub fn run_with_narrative(
    snapshot: &SignalSnapshot,
    cfg: &PipelineConfig,
    renderer: &dyn NarrativeRenderer,
) -> Result<TradePlan, PlanError> {
    snapshot.validate()?;

    let gated = gate(&snapshot.candidates, &cfg.gate);
    let ranked = rank(&gated);
    let allocation = allocate(&ranked, &snapshot.constraints);

    let mut actions = build_entry_actions(snapshot, cfg, &allocation);
    actions.extend(build_exit_actions(snapshot, cfg, &gated, &allocation));

    let notes = base_notes(&allocation, &actions);
    let mut plan = assemble(
        snapshot.horizon_days,
        actions,
        allocation.cash_weight,
        notes,
        &snapshot.constraints,
    )?;

    if renderer.enabled() {
        let text = renderer.render(&PlanFacts::new(&plan));
        apply_narrative(&mut plan, text);
    }
    Ok(plan)
}

/// Buy/hold rows for every allocated symbol, ordered by weight descending
/// then symbol ascending so the plan is reproducible.
fn build_entry_actions(
    snapshot: &SignalSnapshot,
    cfg: &PipelineConfig,
    allocation: &Allocation,
) -> Vec<RecommendedAction> {
    let mut allocated: Vec<&(String, f64)> = allocation
        .weights
        .iter()
        .filter(|(_, w)| *w > 0.0)
        .collect();
    allocated.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    allocated
        .into_iter()
        .filter_map(|(symbol, weight)| {
            let candidate = snapshot.candidates.iter().find(|c| &c.symbol == symbol)?;
            // Allocated weight with a non-positive forecast only happens
            // under the equal-weight fallback; tag it hold, not buy.
            let action = if candidate.expected_return > 0.0 {
                Action::Buy
            } else {
                Action::Hold
            };
            Some(build_action(candidate, action, *weight, cfg, snapshot))
        })
        .collect()
}

/// Sell rows for held symbols that are not allocated and whose signal
/// has turned: gated out, or expected return at/below the sell threshold.
fn build_exit_actions(
    snapshot: &SignalSnapshot,
    cfg: &PipelineConfig,
    gated: &[GatedCandidate],
    allocation: &Allocation,
) -> Vec<RecommendedAction> {
    let mut held: Vec<&str> = snapshot.held.iter().map(|p| p.symbol.as_str()).collect();
    held.sort_unstable();
    held.dedup();

    held.into_iter()
        .filter_map(|symbol| {
            if allocation.weight_of(symbol) > 0.0 {
                return None; // already an entry target
            }
            let g = gated.iter().find(|g| g.candidate.symbol == symbol)?;
            let weak_signal = g.candidate.expected_return <= cfg.sell_threshold;
            if !weak_signal && g.admitted() {
                return None;
            }
            let mut action = build_action(&g.candidate, Action::Sell, 0.0, cfg, snapshot);
            if !g.admitted() {
                action
                    .evidence
                    .extend(g.decision.reasons.iter().map(|r| format!("[{symbol}] gate: {r}")));
            }
            Some(action)
        })
        .collect()
}

fn build_action(
    candidate: &Candidate,
    action: Action,
    weight: f64,
    cfg: &PipelineConfig,
    snapshot: &SignalSnapshot,
) -> RecommendedAction {
    let exec = plan_execution(candidate, action, snapshot.constraints.risk_profile, &cfg.execution);

    // Deterministic fact line first, then collaborator-supplied evidence.
    let mut evidence = vec![format!(
        "[{}] asof={} close={:.2} atr={:.2} uncertainty={:.4} liquidity={:.0}",
        candidate.symbol,
        snapshot.as_of,
        candidate.last_close,
        candidate.atr,
        candidate.uncertainty,
        candidate.liquidity
    )];
    evidence.extend(candidate.evidence.iter().cloned());

    let invalidation = match action {
        Action::Sell => sell_invalidation(),
        _ => buy_invalidation(),
    };

    RecommendedAction {
        symbol: candidate.symbol.clone(),
        action,
        target_weight: weight,
        confidence: confidence(
            candidate.expected_return,
            candidate.uncertainty,
            candidate.model_quality,
        ),
        expected_return: candidate.expected_return,
        uncertainty_band: uncertainty_band(candidate.expected_return, candidate.uncertainty),
        order_plan: exec.order_plan,
        risk_controls: exec.risk_controls,
        evidence,
        invalidation,
    }
}

fn base_notes(allocation: &Allocation, actions: &[RecommendedAction]) -> String {
    let mut notes = String::from(TEMPLATE_NOTES);
    if actions.is_empty() {
        notes.push_str(" No admissible candidates after gating; holding 100% cash.");
    }
    for diag in &allocation.diagnostics {
        notes.push_str(" | ");
        notes.push_str(diag);
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HeldPosition, PortfolioConstraints, RiskProfile};
    use chrono::NaiveDate;

    fn candidate(symbol: &str, er: f64) -> Candidate {
        Candidate {
            symbol: symbol.into(),
            expected_return: er,
            uncertainty: 0.05,
            model_quality: 0.7,
            liquidity: 200_000.0,
            atr: 1.5,
            last_close: 80.0,
            evidence: vec![format!("[{symbol}] momentum positive")],
        }
    }

    fn snapshot(candidates: Vec<Candidate>) -> SignalSnapshot {
        SignalSnapshot {
            as_of: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            horizon_days: 5,
            candidates,
            constraints: PortfolioConstraints {
                top_n: 3,
                max_weight_per_symbol: 0.5,
                min_cash_weight: 0.1,
                risk_profile: RiskProfile::Moderate,
            },
            held: vec![],
        }
    }

    #[test]
    fn buys_carry_positive_weights_and_evidence() {
        let plan = run(
            &snapshot(vec![candidate("FPT", 0.04), candidate("VCB", 0.02)]),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(plan.recommended_actions.len(), 2);
        for a in &plan.recommended_actions {
            assert_eq!(a.action, Action::Buy);
            assert!(a.target_weight > 0.0);
            assert!(a.evidence.len() >= 2);
            assert!(!a.invalidation.is_empty());
        }
    }

    #[test]
    fn held_weak_symbol_becomes_sell() {
        let mut s = snapshot(vec![candidate("FPT", 0.04), candidate("VCB", -0.03)]);
        s.held = vec![HeldPosition {
            symbol: "VCB".into(),
            qty: 100.0,
            avg_cost: 70.0,
        }];
        let plan = run(&s, &PipelineConfig::default()).unwrap();
        let sell = plan
            .recommended_actions
            .iter()
            .find(|a| a.symbol == "VCB")
            .expect("expected sell row");
        assert_eq!(sell.action, Action::Sell);
        assert_eq!(sell.target_weight, 0.0);
    }

    #[test]
    fn held_gated_out_symbol_becomes_sell_with_gate_evidence() {
        let mut weak = candidate("VCB", 0.04);
        weak.liquidity = 1.0; // fails the liquidity gate
        let mut s = snapshot(vec![candidate("FPT", 0.04), weak]);
        s.held = vec![HeldPosition {
            symbol: "VCB".into(),
            qty: 100.0,
            avg_cost: 70.0,
        }];
        let plan = run(&s, &PipelineConfig::default()).unwrap();
        let sell = plan
            .recommended_actions
            .iter()
            .find(|a| a.symbol == "VCB")
            .expect("expected sell row");
        assert_eq!(sell.action, Action::Sell);
        assert!(sell.evidence.iter().any(|e| e.contains("gate:")));
    }

    #[test]
    fn held_healthy_unallocated_symbol_is_left_alone() {
        // Admitted, positive signal, just outside top_n: no sell row.
        let mut s = snapshot(vec![
            candidate("AAA", 0.05),
            candidate("BBB", 0.04),
            candidate("CCC", 0.03),
            candidate("DDD", 0.02),
        ]);
        s.held = vec![HeldPosition {
            symbol: "DDD".into(),
            qty: 10.0,
            avg_cost: 50.0,
        }];
        let plan = run(&s, &PipelineConfig::default()).unwrap();
        assert!(plan.recommended_actions.iter().all(|a| a.symbol != "DDD"));
    }

    #[test]
    fn empty_admitted_set_terminates_normally() {
        let mut c = candidate("FPT", 0.04);
        c.liquidity = 0.0;
        let plan = run(&snapshot(vec![c]), &PipelineConfig::default()).unwrap();
        assert!(plan.recommended_actions.is_empty());
        assert_eq!(plan.cash_weight, 1.0);
        assert!(plan.notes.contains("No admissible candidates"));
    }

    #[test]
    fn equal_weight_fallback_rows_are_tagged_hold() {
        // Admitted (|er|/unc >= 0.15) but negative: scores all non-positive.
        let plan = run(
            &snapshot(vec![candidate("FPT", -0.02), candidate("VCB", -0.03)]),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(plan.recommended_actions.len(), 2);
        for a in &plan.recommended_actions {
            assert_eq!(a.action, Action::Hold);
            assert!(a.target_weight > 0.0);
            assert!(a.order_plan.entry_rule.starts_with("HOLD"));
        }
    }

    #[test]
    fn identical_inputs_yield_byte_identical_plans() {
        let s = snapshot(vec![candidate("FPT", 0.04), candidate("VCB", 0.02)]);
        let cfg = PipelineConfig::default();
        let a = serde_json::to_string(&run(&s, &cfg).unwrap()).unwrap();
        let b = serde_json::to_string(&run(&s, &cfg).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_snapshot_is_rejected_before_any_stage() {
        let mut s = snapshot(vec![candidate("FPT", 0.04)]);
        s.constraints.min_cash_weight = 2.0;
        assert!(matches!(
            run(&s, &PipelineConfig::default()),
            Err(PlanError::Input(_))
        ));
    }
}
