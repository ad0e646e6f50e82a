//! Run artifact persistence.
//!
//! Each run writes into a directory keyed by its run-id and snapshot
//! fingerprint prefixes, so reproductions of the same run land in the
//! same place. Artifacts are write-once: an existing plan.json means the
//! run was already persisted and nothing is rewritten.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::reporting::summary::render_summary;
use crate::runner::PlanRunResult;

/// Locations of one run's artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub plan_json: PathBuf,
    pub summary_md: PathBuf,
}

/// Directory key: short run-id plus short snapshot fingerprint. The
/// config alone is not enough — the same config over a different
/// snapshot is a different run.
fn run_key(result: &PlanRunResult) -> String {
    format!(
        "{}-{}",
        &result.run_id[..12.min(result.run_id.len())],
        &result.snapshot_fingerprint[..8.min(result.snapshot_fingerprint.len())]
    )
}

/// Persist a run's artifacts under `base_dir`. Returns the paths whether
/// they were written now or by an earlier identical run.
pub fn save_artifacts(base_dir: &Path, result: &PlanRunResult) -> Result<ArtifactPaths> {
    let dir = base_dir.join(run_key(result));
    let paths = ArtifactPaths {
        plan_json: dir.join("plan.json"),
        summary_md: dir.join("summary.md"),
        dir,
    };

    if paths.plan_json.exists() {
        info!(dir = %paths.dir.display(), "artifacts already present, skipping write");
        return Ok(paths);
    }

    std::fs::create_dir_all(&paths.dir)
        .with_context(|| format!("failed to create run directory {}", paths.dir.display()))?;

    let json = serde_json::to_string_pretty(result).context("failed to serialize plan run")?;
    std::fs::write(&paths.plan_json, json)
        .with_context(|| format!("failed to write {}", paths.plan_json.display()))?;

    std::fs::write(&paths.summary_md, render_summary(result))
        .with_context(|| format!("failed to write {}", paths.summary_md.display()))?;

    info!(dir = %paths.dir.display(), "artifacts written");
    Ok(paths)
}

// ─── Tests ───────────────────────────────────────────────────────────
