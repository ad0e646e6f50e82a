//! TradePlan CLI — recommendation runs from the command line.
//!
//! Commands:
//! - `recommend` — produce a trade plan from a snapshot under one config
//! - `sweep` — produce plans under all three risk profiles

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tradeplan_core::domain::SignalSnapshot;
use tradeplan_runner::{
    load_snapshot_json, run_recommendation, save_artifacts, snapshot_from_csv, sweep_profiles,
    PlanRunResult, RunConfig,
};

#[derive(Parser)]
#[command(
    name = "tradeplan",
    about = "TradePlan CLI — deterministic trade-plan recommendations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce a trade plan from a snapshot.
    Recommend {
        /// Path to a TOML run configuration. Defaults apply if omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Self-contained JSON snapshot file.
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Candidates CSV (constraints and as-of date come from --config).
        #[arg(long)]
        candidates: Option<PathBuf>,

        /// Output directory for plan.json and summary.md.
        #[arg(long, default_value = "runs")]
        output_dir: PathBuf,

        /// Print the full plan JSON to stdout instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Produce plans under all three risk profiles.
    Sweep {
        /// Path to a TOML run configuration. Defaults apply if omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Self-contained JSON snapshot file.
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Candidates CSV (constraints and as-of date come from --config).
        #[arg(long)]
        candidates: Option<PathBuf>,

        /// Output directory for per-profile artifacts.
        #[arg(long, default_value = "runs")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend {
            config,
            snapshot,
            candidates,
            output_dir,
            json,
        } => run_recommend(config, snapshot, candidates, output_dir, json),
        Commands::Sweep {
            config,
            snapshot,
            candidates,
            output_dir,
        } => run_sweep(config, snapshot, candidates, output_dir),
    }
}

fn load_inputs(
    config_path: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
    candidates_path: Option<PathBuf>,
) -> Result<(RunConfig, SignalSnapshot)> {
    let config = match config_path {
        Some(path) => RunConfig::from_path(&path)?,
        None => RunConfig::default(),
    };

    let snapshot = match (snapshot_path, candidates_path) {
        (Some(_), Some(_)) => bail!("--snapshot and --candidates are mutually exclusive"),
        (None, None) => bail!("one of --snapshot or --candidates is required"),
        (Some(path), None) => load_snapshot_json(&path)
            .with_context(|| format!("loading snapshot {}", path.display()))?,
        (None, Some(path)) => snapshot_from_csv(&path, &config)
            .with_context(|| format!("loading candidates {}", path.display()))?,
    };

    Ok((config, snapshot))
}

fn run_recommend(
    config_path: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
    candidates_path: Option<PathBuf>,
    output_dir: PathBuf,
    json: bool,
) -> Result<()> {
    let (config, snapshot) = load_inputs(config_path, snapshot_path, candidates_path)?;
    let result = run_recommendation(&snapshot, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.plan)?);
    } else {
        print_summary(&result);
    }

    let paths = save_artifacts(&output_dir, &result)?;
    println!("Artifacts saved to: {}", paths.dir.display());
    Ok(())
}

fn run_sweep(
    config_path: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
    candidates_path: Option<PathBuf>,
    output_dir: PathBuf,
) -> Result<()> {
    let (config, snapshot) = load_inputs(config_path, snapshot_path, candidates_path)?;
    let runs = sweep_profiles(&snapshot, &config)?;

    for run in &runs {
        println!("=== profile: {} ===", run.profile.as_str());
        print_summary(&run.result);
        let paths = save_artifacts(&output_dir, &run.result)?;
        println!("Artifacts saved to: {}", paths.dir.display());
        println!();
    }
    Ok(())
}

fn print_summary(result: &PlanRunResult) {
    let plan = &result.plan;
    println!("Run ID:      {}", &result.run_id[..12]);
    println!("Snapshot:    {}", &result.snapshot_fingerprint[..12]);
    println!("Horizon:     {} days", plan.horizon_days);
    println!("Cash weight: {:.2}%", plan.cash_weight * 100.0);
    if plan.recommended_actions.is_empty() {
        println!("No actionable recommendations.");
        return;
    }
    println!(
        "{:<8} {:<6} {:>8} {:>11} {:>12}",
        "Symbol", "Action", "Weight", "Confidence", "Exp. Return"
    );
    for a in &plan.recommended_actions {
        println!(
            "{:<8} {:<6} {:>7.2}% {:>11.2} {:>+11.2}%",
            a.symbol,
            a.action.tag(),
            a.target_weight * 100.0,
            a.confidence,
            a.expected_return * 100.0
        );
    }
}
