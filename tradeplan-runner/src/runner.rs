//! Single plan run: snapshot in, versioned result envelope out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, info_span};

use tradeplan_core::domain::{SignalSnapshot, TradePlan};
use tradeplan_core::fingerprint::{plan_fingerprint, snapshot_fingerprint};
use tradeplan_core::pipeline;
use tradeplan_core::PlanError;

use crate::config::{RunConfig, RunId};
use crate::snapshot_loader::LoadError;

/// Version tag stamped into every result envelope. Bumped when the plan
/// wire format changes shape.
pub const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum RunError {
    #[error("snapshot load failed: {0}")]
    Load(#[from] LoadError),

    #[error("pipeline failed: {0}")]
    Plan(#[from] PlanError),
}

/// Result envelope for one plan run. Everything needed to audit and
/// reproduce the run travels with the plan itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRunResult {
    pub schema_version: String,
    pub run_id: RunId,
    pub snapshot_fingerprint: String,
    pub plan_fingerprint: String,
    /// Wall-clock stamp. Metadata only; never feeds the pipeline.
    pub generated_at: DateTime<Utc>,
    pub plan: TradePlan,
}

/// Run the pipeline once over a snapshot and wrap the plan in its
/// audit envelope.
pub fn run_recommendation(
    snapshot: &SignalSnapshot,
    config: &RunConfig,
) -> Result<PlanRunResult, RunError> {
    let run_id = config.run_id();
    let span = info_span!("plan_run", run_id = %&run_id[..12]);
    let _guard = span.enter();

    info!(
        candidates = snapshot.candidates.len(),
        held = snapshot.held.len(),
        as_of = %snapshot.as_of,
        profile = snapshot.constraints.risk_profile.as_str(),
        "running recommendation pipeline"
    );

    let plan = pipeline::run(snapshot, &config.pipeline_config())?;

    info!(
        actions = plan.recommended_actions.len(),
        cash_weight = plan.cash_weight,
        "plan assembled"
    );

    Ok(PlanRunResult {
        schema_version: SCHEMA_VERSION.to_string(),
        run_id,
        snapshot_fingerprint: snapshot_fingerprint(snapshot),
        plan_fingerprint: plan_fingerprint(&plan),
        generated_at: Utc::now(),
        plan,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────
