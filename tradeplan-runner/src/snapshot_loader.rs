//! Snapshot loading from disk.
//!
//! Two input shapes:
//! - a JSON `SignalSnapshot` file, self-contained (constraints, held
//!   positions, as-of date all inside);
//! - a bare candidates CSV, with constraints and plan settings supplied
//!   by the run configuration.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use tradeplan_core::domain::{Candidate, SignalSnapshot};

use crate::config::RunConfig;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed candidates CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// Load a self-contained JSON snapshot.
pub fn load_snapshot_json(path: &Path) -> Result<SignalSnapshot, LoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let snapshot: SignalSnapshot = serde_json::from_str(&raw)?;
    debug!(
        candidates = snapshot.candidates.len(),
        held = snapshot.held.len(),
        "loaded JSON snapshot"
    );
    Ok(snapshot)
}

/// One CSV row. `evidence` is an optional semicolon-separated list.
#[derive(Debug, Deserialize)]
struct CsvRow {
    symbol: String,
    expected_return: f64,
    uncertainty: f64,
    model_quality: f64,
    liquidity: f64,
    atr: f64,
    last_close: f64,
    evidence: Option<String>,
}

impl CsvRow {
    fn into_candidate(self) -> Candidate {
        let evidence = self
            .evidence
            .as_deref()
            .unwrap_or("")
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Candidate {
            symbol: self.symbol,
            expected_return: self.expected_return,
            uncertainty: self.uncertainty,
            model_quality: self.model_quality,
            liquidity: self.liquidity,
            atr: self.atr,
            last_close: self.last_close,
            evidence,
        }
    }
}

/// Load candidates from a headered CSV file.
pub fn load_candidates_csv(path: &Path) -> Result<Vec<Candidate>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let mut candidates = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        candidates.push(row?.into_candidate());
    }
    debug!(candidates = candidates.len(), "loaded candidates CSV");
    Ok(candidates)
}

/// Build a snapshot from a candidates CSV plus config-supplied
/// constraints. CSV inputs carry no held positions.
pub fn snapshot_from_csv(path: &Path, config: &RunConfig) -> Result<SignalSnapshot, LoadError> {
    let as_of = config.plan.as_of.ok_or_else(|| {
        LoadError::Config("[plan] as_of is required when loading a candidates CSV".into())
    })?;
    Ok(SignalSnapshot {
        as_of,
        horizon_days: config.plan.horizon_days,
        candidates: load_candidates_csv(path)?,
        constraints: config.constraints,
        held: Vec::new(),
    })
}

// ─── Tests ───────────────────────────────────────────────────────────
