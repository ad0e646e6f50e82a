//! Risk-profile sweep: the same snapshot planned under every profile.
//!
//! Profiles are independent read-only runs, so they parallelize with
//! rayon. Results merge back in canonical profile order (conservative,
//! moderate, aggressive) so the sweep output is deterministic regardless
//! of scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use tradeplan_core::domain::{RiskProfile, SignalSnapshot};

use crate::config::RunConfig;
use crate::runner::{run_recommendation, PlanRunResult, RunError};

/// One profile's slice of a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRun {
    pub profile: RiskProfile,
    pub result: PlanRunResult,
}

/// Run the pipeline under all risk profiles in parallel.
///
/// The snapshot's own `risk_profile` is overridden per run; everything
/// else is shared. Any failing profile fails the whole sweep.
pub fn sweep_profiles(
    snapshot: &SignalSnapshot,
    config: &RunConfig,
) -> Result<Vec<ProfileRun>, RunError> {
    info!(profiles = RiskProfile::ALL.len(), "starting profile sweep");

    let mut runs = RiskProfile::ALL
        .par_iter()
        .map(|&profile| {
            let mut profiled = snapshot.clone();
            profiled.constraints.risk_profile = profile;
            let mut profiled_config = config.clone();
            profiled_config.constraints.risk_profile = profile;
            run_recommendation(&profiled, &profiled_config)
                .map(|result| ProfileRun { profile, result })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Canonical order, independent of which worker finished first.
    runs.sort_by_key(|run| {
        RiskProfile::ALL
            .iter()
            .position(|p| *p == run.profile)
            .unwrap_or(usize::MAX)
    });
    Ok(runs)
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tradeplan_core::domain::{Candidate, PortfolioConstraints};

    fn snapshot() -> SignalSnapshot {
        SignalSnapshot {
            as_of: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            horizon_days: 5,
            candidates: vec![Candidate {
                symbol: "FPT".into(),
                expected_return: 0.04,
                uncertainty: 0.05,
                model_quality: 0.7,
                liquidity: 200_000.0,
                atr: 2.0,
                last_close: 100.0,
                evidence: vec![],
            }],
            constraints: PortfolioConstraints::default(),
            held: vec![],
        }
    }

    #[test]
    fn sweep_covers_all_profiles_in_order() {
        let runs = sweep_profiles(&snapshot(), &RunConfig::default()).unwrap();
        let profiles: Vec<RiskProfile> = runs.iter().map(|r| r.profile).collect();
        assert_eq!(profiles, RiskProfile::ALL.to_vec());
    }

    #[test]
    fn profiles_differ_in_risk_budget_only_where_expected() {
        let runs = sweep_profiles(&snapshot(), &RunConfig::default()).unwrap();
        let budget = |run: &ProfileRun| {
            run.result.plan.recommended_actions[0]
                .risk_controls
                .max_loss_pct_portfolio
        };
        assert_eq!(budget(&runs[0]), 0.005);
        assert_eq!(budget(&runs[1]), 0.010);
        assert_eq!(budget(&runs[2]), 0.015);
        // Same allocation regardless of profile.
        let weights: Vec<f64> = runs
            .iter()
            .map(|r| r.result.plan.recommended_actions[0].target_weight)
            .collect();
        assert_eq!(weights[0], weights[1]);
        assert_eq!(weights[1], weights[2]);
    }

    #[test]
    fn sweep_is_deterministic() {
        let config = RunConfig::default();
        let a = sweep_profiles(&snapshot(), &config).unwrap();
        let b = sweep_profiles(&snapshot(), &config).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.result.plan_fingerprint, y.result.plan_fingerprint);
        }
    }
}
