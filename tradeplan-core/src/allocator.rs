//! Allocator — converts ranked candidates plus portfolio constraints into
//! target weights and a cash weight.
//!
//! Discrete top-N selection followed by clamp-and-redistribute, NOT a
//! continuous mean-variance optimizer. The frontier tool elsewhere in the
//! system is a different algorithm family and stays a separate component.
//!
//! All arithmetic is double precision; weights are rounded only at
//! serialization (see `domain::plan`), never mid-computation.

use serde::{Deserialize, Serialize};

use crate::domain::PortfolioConstraints;
use crate::scorer::RankedCandidate;

/// Target weights plus cash. Weight order follows the ranking order, so
/// the allocation is deterministic end to end.
///
/// Invariants (within 1e-6): weights sum with `cash_weight` to 1, every
/// weight <= `max_weight_per_symbol`, `cash_weight >= min_cash_weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub weights: Vec<(String, f64)>,
    pub cash_weight: f64,
    /// Human-readable trace of the allocation decisions.
    pub diagnostics: Vec<String>,
}

impl Allocation {
    /// All-cash allocation with an explanatory diagnostic.
    fn all_cash(reason: &str) -> Self {
        Self {
            weights: Vec::new(),
            cash_weight: 1.0,
            diagnostics: vec![format!("{reason} -> 100% cash")],
        }
    }

    /// Weight for `symbol`, or 0.0 when unallocated.
    pub fn weight_of(&self, symbol: &str) -> f64 {
        self.weights
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    /// Sum of all symbol weights.
    pub fn total_invested(&self) -> f64 {
        self.weights.iter().map(|(_, w)| w).sum()
    }
}

/// Allocate capital across the top-N ranked candidates.
///
/// The constraints must already be validated (`PortfolioConstraints::check`);
/// the snapshot validation guarantees this before the pipeline runs.
pub fn allocate(ranked: &[RankedCandidate], constraints: &PortfolioConstraints) -> Allocation {
    let mut diagnostics = Vec::new();

    let n = ranked.len().min(constraints.top_n);
    let selected = &ranked[..n];
    if selected.is_empty() {
        return Allocation::all_cash("no admitted candidates");
    }

    // Raw weights: normalized positive scores. When every selected score
    // is non-positive, fall back to equal weighting — avoids a zero
    // divisor and avoids concentrating capital on a net-negative
    // risk-adjusted basis. (Design choice, recorded in DESIGN.md.)
    let positive: Vec<f64> = selected.iter().map(|r| r.score.max(0.0)).collect();
    let score_sum: f64 = positive.iter().sum();
    let mut weights: Vec<f64> = if score_sum > 0.0 {
        positive.iter().map(|s| s / score_sum).collect()
    } else {
        diagnostics.push(format!(
            "all selected scores non-positive -> equal weighting across {n} symbols"
        ));
        vec![1.0 / n as f64; n]
    };

    // Clamp to the per-symbol cap and redistribute the excess among
    // unclamped symbols, proportionally to their current weight. A second
    // pass handles clamps introduced by the first redistribution; any
    // excess still left after that goes to cash, never silently dropped.
    let cap = constraints.max_weight_per_symbol;
    let mut clamped = vec![false; n];
    let mut spilled_to_cash = 0.0;

    for pass in 0..2 {
        let mut excess = 0.0;
        for (i, w) in weights.iter_mut().enumerate() {
            if *w > cap {
                excess += *w - cap;
                *w = cap;
                clamped[i] = true;
            }
        }
        if excess <= 0.0 {
            break;
        }
        let free: f64 = weights
            .iter()
            .zip(&clamped)
            .filter(|(_, &c)| !c)
            .map(|(w, _)| *w)
            .sum();
        if free <= 0.0 {
            diagnostics.push(format!("pass {pass}: no unclamped capacity -> excess to cash"));
            spilled_to_cash += excess;
            break;
        }
        diagnostics.push(format!(
            "pass {pass}: redistributed clamp excess {excess:.6} over unclamped weight {free:.6}"
        ));
        for (w, &c) in weights.iter_mut().zip(&clamped) {
            if !c {
                *w += excess * (*w / free);
            }
        }
    }
    // Whatever the second redistribution pushed back over the cap is
    // infeasible within the cap constraint; route it to cash.
    for w in weights.iter_mut() {
        if *w > cap {
            spilled_to_cash += *w - cap;
            *w = cap;
        }
    }
    if spilled_to_cash > 0.0 {
        diagnostics.push(format!("infeasible clamp excess {spilled_to_cash:.6} -> cash"));
    }

    // Enforce the minimum cash floor by scaling every symbol weight down
    // proportionally. Scaling down can never re-violate the cap.
    let investable = 1.0 - constraints.min_cash_weight;
    let total: f64 = weights.iter().sum();
    if total > investable {
        let scale = investable / total;
        for w in weights.iter_mut() {
            *w *= scale;
        }
        diagnostics.push(format!(
            "scaled weights by {scale:.6} to honor min_cash_weight={:.4}",
            constraints.min_cash_weight
        ));
    }

    let used: f64 = weights.iter().sum();
    // The normalized weights can re-sum to 1 plus a final-bit residue,
    // which would push cash a few 1e-16 below zero. Cash is a remainder,
    // never a debt.
    let cash_weight = (1.0 - used).max(0.0);
    diagnostics.push(format!(
        "picked={}/{} invested={used:.6} cash={cash_weight:.6}",
        n,
        ranked.len()
    ));

    Allocation {
        weights: selected
            .iter()
            .zip(weights)
            .map(|(r, w)| (r.candidate.symbol.clone(), w))
            .collect(),
        cash_weight,
        diagnostics,
    }
}
