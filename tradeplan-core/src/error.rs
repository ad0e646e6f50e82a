//! Pipeline error taxonomy.
//!
//! Only snapshot-level and schema-level problems are fatal. Per-candidate
//! issues (missing risk parameters, failed gate rules) are recovered
//! locally with a recorded reason and never surface as errors. Infeasible
//! allocations resolve deterministically inside the allocator; if the
//! constraints themselves are unsatisfiable they are rejected up front as
//! input errors.

use thiserror::Error;

/// Fatal pipeline errors. Callers receive either a fully valid
/// `TradePlan` or one of these — never a plan with unexplained gaps.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Malformed or missing required snapshot/constraint fields.
    #[error("invalid input: {0}")]
    Input(String),

    /// The assembled plan violates its own schema. No partial output
    /// is produced.
    #[error("plan validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}
