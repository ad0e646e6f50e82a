//! Narrative enrichment hook — optional human-readable text layer.
//!
//! An external renderer (e.g. an LLM-backed service) may rewrite the
//! plan's `notes`, per-symbol `entry_rule`, and `invalidation` text. It
//! sees the plan only through the read-only `PlanFacts` view, so it can
//! quote validated facts but can never introduce or alter numbers in the
//! plan. The pipeline is fully usable with the hook disabled: the default
//! `TemplateNarrative` produces deterministic template text.

use std::collections::BTreeMap;

use crate::domain::{Action, RecommendedAction, TradePlan};

/// Read-only view over an already-validated plan. Getters only — the
/// narrative layer cannot reach mutable state through it.
pub struct PlanFacts<'a> {
    plan: &'a TradePlan,
}

impl<'a> PlanFacts<'a> {
    pub fn new(plan: &'a TradePlan) -> Self {
        Self { plan }
    }

    pub fn horizon_days(&self) -> u32 {
        self.plan.horizon_days
    }

    pub fn cash_weight(&self) -> f64 {
        self.plan.cash_weight
    }

    pub fn actions(&self) -> impl Iterator<Item = &RecommendedAction> {
        self.plan.recommended_actions.iter()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.plan
            .recommended_actions
            .iter()
            .map(|a| a.symbol.as_str())
            .collect()
    }

    /// Evidence strings for one symbol — the only facts the narrative
    /// layer is allowed to quote.
    pub fn evidence_for(&self, symbol: &str) -> &[String] {
        self.plan
            .recommended_actions
            .iter()
            .find(|a| a.symbol == symbol)
            .map(|a| a.evidence.as_slice())
            .unwrap_or(&[])
    }
}

/// Text replacements for one symbol. `None` keeps the existing text.
#[derive(Debug, Clone, Default)]
pub struct SymbolText {
    pub entry_rule: Option<String>,
    pub invalidation: Option<Vec<String>>,
}

/// Full narrative output: plan-level notes plus per-symbol text.
#[derive(Debug, Clone, Default)]
pub struct NarrativeText {
    pub notes: Option<String>,
    pub per_symbol: BTreeMap<String, SymbolText>,
}

/// The enrichment hook. Implementations must only quote facts available
/// through `PlanFacts`.
pub trait NarrativeRenderer {
    /// Whether an external renderer is active. When false, callers use
    /// the deterministic template output.
    fn enabled(&self) -> bool;

    fn render(&self, facts: &PlanFacts<'_>) -> NarrativeText;
}

/// Disabled-mode renderer: deterministic templates, no external calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrative;

/// Plan-level note used when no external renderer is attached.
pub const TEMPLATE_NOTES: &str = "Narrative disabled: plan generated by the deterministic \
     rulebase and allocator. Review risk levels and fill likelihood before placing orders.";

/// Template invalidation lines for a new long position.
pub fn buy_invalidation() -> Vec<String> {
    vec![
        "Close below (entry - k_sl*ATR) per the stop-loss rule.".into(),
        "Volatility regime spike (uncertainty expands) weakening the thesis.".into(),
    ]
}

/// Template invalidation lines for an exit recommendation.
pub fn sell_invalidation() -> Vec<String> {
    vec!["Signal reverses positive (momentum + sentiment) within 3-5 sessions.".into()]
}

impl NarrativeRenderer for TemplateNarrative {
    fn enabled(&self) -> bool {
        false
    }

    fn render(&self, facts: &PlanFacts<'_>) -> NarrativeText {
        let per_symbol = facts
            .actions()
            .map(|a| {
                let invalidation = match a.action {
                    Action::Sell => sell_invalidation(),
                    _ => buy_invalidation(),
                };
                (
                    a.symbol.clone(),
                    SymbolText {
                        entry_rule: None,
                        invalidation: Some(invalidation),
                    },
                )
            })
            .collect();
        NarrativeText {
            notes: Some(TEMPLATE_NOTES.to_string()),
            per_symbol,
        }
    }
}

/// Apply narrative text to a validated plan. Only `notes`, `entry_rule`,
/// and `invalidation` can change; every numeric field is untouched by
/// construction.
pub fn apply_narrative(plan: &mut TradePlan, text: NarrativeText) {
    if let Some(notes) = text.notes {
        plan.notes = notes;
    }
    for action in &mut plan.recommended_actions {
        if let Some(sym_text) = text.per_symbol.get(&action.symbol) {
            if let Some(entry_rule) = &sym_text.entry_rule {
                action.order_plan.entry_rule = entry_rule.clone();
            }
            if let Some(invalidation) = &sym_text.invalidation {
                action.invalidation = invalidation.clone();
            }
        }
    }
}
