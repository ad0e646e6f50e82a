//! TradePlan Core — the deterministic recommendation pipeline.
//!
//! This crate contains the heart of the decision-support system:
//! - Domain types (candidates, constraints, snapshots, the plan wire format)
//! - Gate: admissibility filtering with per-candidate reasons
//! - Scorer: risk-adjusted ranking with a total tie-break order
//! - Allocator: top-N selection with clamp-and-redistribute weighting
//! - Execution planner: entry rules, ladders, ATR stops and targets
//! - Assembler: plan construction with fatal schema validation
//! - Narrative hook: read-only facts view for optional text enrichment
//!
//! The core is a pure, synchronous computation over an immutable
//! snapshot: no I/O, no shared mutable state, no suspension points.
//! Identical inputs produce byte-identical plans. It produces a plan,
//! never orders.

pub mod allocator;
pub mod assembler;
pub mod domain;
pub mod error;
pub mod execution;
pub mod fingerprint;
pub mod gate;
pub mod narrative;
pub mod pipeline;
pub mod scorer;

pub use error::PlanError;
