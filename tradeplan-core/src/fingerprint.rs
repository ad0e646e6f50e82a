//! Content-addressable fingerprints for snapshots and plans.
//!
//! Determinism is a core contract: running the pipeline twice on the same
//! snapshot must produce byte-identical plans. Fingerprints make that
//! auditable — two runs with equal fingerprints produced equal artifacts.

use serde::Serialize;

use crate::domain::{SignalSnapshot, TradePlan};

/// Blake3 hex digest of a value's canonical JSON encoding.
pub fn fingerprint<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).expect("fingerprint serialization failed");
    blake3::hash(json.as_bytes()).to_hex().to_string()
}

/// Fingerprint of the immutable input snapshot.
pub fn snapshot_fingerprint(snapshot: &SignalSnapshot) -> String {
    fingerprint(snapshot)
}

/// Fingerprint of the terminal plan artifact.
pub fn plan_fingerprint(plan: &TradePlan) -> String {
    fingerprint(plan)
}
