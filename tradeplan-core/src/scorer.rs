//! Scorer — risk-adjusted ranking of admitted candidates.
//!
//! Score is `expected_return / uncertainty` (risk-adjusted momentum).
//! Ranking is a total order so top-N selection is reproducible:
//! score desc, then model_quality desc, then liquidity desc, then
//! symbol asc. Comparison uses `f64::total_cmp`, so equal inputs always
//! rank identically regardless of evaluation order.

use std::cmp::Ordering;

use crate::domain::Candidate;
use crate::gate::GatedCandidate;

/// An admitted candidate with its risk-adjusted score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub score: f64,
}

/// Risk-adjusted score for a single candidate.
///
/// Callers must only score candidates with defined risk (the gate
/// guarantees this); `None` is returned otherwise rather than a
/// fabricated value.
pub fn score(candidate: &Candidate) -> Option<f64> {
    if candidate.has_defined_risk() {
        Some(candidate.expected_return / candidate.uncertainty)
    } else {
        None
    }
}

/// Rank the admitted subset of gated candidates, descending by
/// (score, model_quality, liquidity, symbol asc).
pub fn rank(gated: &[GatedCandidate]) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = gated
        .iter()
        .filter(|g| g.admitted())
        .filter_map(|g| {
            score(&g.candidate).map(|s| RankedCandidate {
                candidate: g.candidate.clone(),
                score: s,
            })
        })
        .collect();

    ranked.sort_by(compare);
    ranked
}

fn compare(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.candidate.model_quality.total_cmp(&a.candidate.model_quality))
        .then_with(|| b.candidate.liquidity.total_cmp(&a.candidate.liquidity))
        .then_with(|| a.candidate.symbol.cmp(&b.candidate.symbol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GatingDecision;

    fn gated(symbol: &str, er: f64, unc: f64, mq: f64, liq: f64) -> GatedCandidate {
        GatedCandidate {
            candidate: Candidate {
                symbol: symbol.into(),
                expected_return: er,
                uncertainty: unc,
                model_quality: mq,
                liquidity: liq,
                atr: 1.0,
                last_close: 50.0,
                evidence: vec![],
            },
            decision: GatingDecision {
                admitted: true,
                reasons: vec![],
            },
        }
    }

    #[test]
    fn ranks_descending_by_score() {
        let ranked = rank(&[
            gated("LOW", 0.01, 0.05, 0.7, 1e5),
            gated("HIGH", 0.05, 0.05, 0.7, 1e5),
        ]);
        assert_eq!(ranked[0].candidate.symbol, "HIGH");
        assert!((ranked[0].score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tie_broken_by_model_quality_then_liquidity_then_symbol() {
        let ranked = rank(&[
            gated("BBB", 0.04, 0.04, 0.70, 1e5),
            gated("AAA", 0.04, 0.04, 0.70, 1e5),
            gated("CCC", 0.04, 0.04, 0.70, 2e5),
            gated("DDD", 0.04, 0.04, 0.80, 1e5),
        ]);
        let symbols: Vec<&str> = ranked.iter().map(|r| r.candidate.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["DDD", "CCC", "AAA", "BBB"]);
    }

    #[test]
    fn excluded_candidates_are_not_scored() {
        let mut g = gated("OUT", 0.05, 0.05, 0.7, 1e5);
        g.decision = GatingDecision {
            admitted: false,
            reasons: vec!["low liquidity".into()],
        };
        assert!(rank(&[g]).is_empty());
    }

    #[test]
    fn negative_expected_return_scores_negative() {
        let ranked = rank(&[gated("NEG", -0.02, 0.04, 0.7, 1e5)]);
        assert!((ranked[0].score + 0.5).abs() < 1e-12);
    }

    #[test]
    fn ranking_is_deterministic_across_input_orders() {
        let a = gated("AAA", 0.04, 0.04, 0.7, 1e5);
        let b = gated("BBB", 0.03, 0.03, 0.7, 1e5);
        let c = gated("CCC", 0.02, 0.04, 0.7, 1e5);
        let r1 = rank(&[a.clone(), b.clone(), c.clone()]);
        let r2 = rank(&[c, b, a]);
        assert_eq!(r1, r2);
    }
}
