//! Artifact export pipeline: plan JSON and markdown summary.

pub mod artifacts;
pub mod summary;

pub use artifacts::{save_artifacts, ArtifactPaths};
pub use summary::render_summary;
