//! Serializable run configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use tradeplan_core::domain::PortfolioConstraints;
use tradeplan_core::execution::ExecutionConfig;
use tradeplan_core::gate::GateConfig;
use tradeplan_core::pipeline::PipelineConfig;

/// Unique identifier for a plan run (content-addressable hash).
pub type RunId = String;

/// Serializable configuration for a single plan run, loaded from TOML.
///
/// Captures everything needed to reproduce a run from the same snapshot:
/// - Plan-level settings (horizon, as-of date, sell threshold)
/// - Gate thresholds
/// - Portfolio constraints (used when the snapshot comes from a bare
///   candidates CSV; a JSON snapshot carries its own)
/// - Execution-rule knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunConfig {
    pub plan: PlanSettings,
    pub gate: GateConfig,
    pub constraints: PortfolioConstraints,
    pub execution: ExecutionConfig,
}

/// The `[plan]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSettings {
    pub horizon_days: u32,
    /// As-of date stamped on snapshots built from a candidates CSV.
    /// JSON snapshots carry their own and ignore this.
    pub as_of: Option<chrono::NaiveDate>,
    /// Expected-return level at or below which a held, unallocated
    /// symbol becomes a sell recommendation.
    pub sell_threshold: f64,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            horizon_days: 5,
            as_of: None,
            sell_threshold: -0.01,
        }
    }
}

impl RunConfig {
    /// Load and parse a TOML run configuration.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs get the same RunId, so artifact
    /// directories keyed by it collide exactly when the runs would be
    /// reproductions of each other.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// The core pipeline knobs carried by this config.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            gate: self.gate,
            execution: self.execution,
            sell_threshold: self.plan.sell_threshold,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
