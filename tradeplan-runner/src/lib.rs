//! TradePlan Runner — plan run orchestration around `tradeplan-core`.
//!
//! This crate builds on the pure pipeline to provide:
//! - Snapshot loading (self-contained JSON or candidates CSV + config)
//! - Serializable TOML run configuration with content-addressed run IDs
//! - Single-run execution with an auditable result envelope
//! - Risk-profile sweeps (parallel, deterministically merged)
//! - Artifact persistence (plan.json + markdown summary, write-once)

pub mod config;
pub mod reporting;
pub mod runner;
pub mod snapshot_loader;
pub mod sweep;

pub use config::{PlanSettings, RunConfig, RunId};
pub use reporting::{save_artifacts, render_summary, ArtifactPaths};
pub use runner::{run_recommendation, PlanRunResult, RunError, SCHEMA_VERSION};
pub use snapshot_loader::{
    load_candidates_csv, load_snapshot_json, snapshot_from_csv, LoadError,
};
pub use sweep::{sweep_profiles, ProfileRun};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn run_types_are_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<PlanRunResult>();
        assert_sync::<PlanRunResult>();
        assert_send::<ProfileRun>();
        assert_sync::<ProfileRun>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
