//! quickstart: sample a sequential sampling model and score the sample.
//!
//! ```text
//! cargo run -p quickstart --release [-- job.json]
//! ```
//!
//! The job file names a family, its raw parameters, the draw count, and an
//! optional `RunConfig`; without one the embedded DDM job below is used.
//! Outcomes land in `output/quickstart/outcomes.csv`; for families with an
//! evidence-path mode, a few trajectories land in `output/quickstart/paths/`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{Level, info, warn};

use ssm_core::{RawParams, RunConfig, SsmError};
use ssm_output::{CsvWriter, SampleOutputObserver};
use ssm_sim::{Registry, SimBuilder, Simulator};

// ── Job description ───────────────────────────────────────────────────────────

const DEFAULT_JOB: &str = r#"{
    "family": "DDM",
    "params": { "nu": 1.0, "alpha": 0.8, "tau": 0.3, "z": 0.5 },
    "draws":  10000,
    "config": { "seed": 42 }
}"#;

const OUTPUT_DIR:        &str  = "output/quickstart";
const TRAJECTORY_DRAWS:  usize = 20;

#[derive(Deserialize)]
struct Job {
    family: String,
    params: RawParams,
    draws:  usize,
    #[serde(default)]
    config: RunConfig,
}

fn load_job(path: Option<PathBuf>) -> Result<Job> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(serde_json::from_str(DEFAULT_JOB)?),
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).with_target(false).init();

    let job = load_job(std::env::args_os().nth(1).map(PathBuf::from))?;
    let registry = Registry::with_builtin_models();
    let family = registry.get_by_name(&job.family)?.family();
    let spec = registry.validate(family, &job.params)?;
    info!(family = %family, choices = spec.n_choices(), tau = spec.non_decision_time(), "specification validated");

    let sim = SimBuilder::new(&registry, spec).config(job.config).build()?;

    write_trajectories(&sim, &Path::new(OUTPUT_DIR).join("paths"))?;

    std::fs::create_dir_all(OUTPUT_DIR)?;
    let mut obs = SampleOutputObserver::new(CsvWriter::new(Path::new(OUTPUT_DIR))?);
    let t0 = Instant::now();
    let batch = sim.sample(job.draws, &mut obs)?;
    info!(draws = batch.len(), elapsed_s = t0.elapsed().as_secs_f64(), "sampling complete");
    if let Some(e) = obs.take_error() {
        warn!(error = %e, "writing outcomes failed");
    }

    let scored = sim.density_batch(&batch.to_outcomes())?;
    info!(
        log_likelihood = scored.log_likelihood(),
        per_draw = scored.log_likelihood() / batch.len() as f64,
        truncated = scored.warnings.len(),
        "sample scored under its generating parameters"
    );

    // ── Summary table ─────────────────────────────────────────────────────
    let counts = batch.choice_counts(sim.spec().n_choices());
    println!();
    println!("{:<8} {:>8} {:>10} {:>10}", "Choice", "Count", "Share", "Mean RT");
    println!("{}", "-".repeat(40));
    for (c, &count) in counts.iter().enumerate() {
        let mean = batch
            .mean_rt_for(ssm_core::Choice(c as u16))
            .map_or_else(|| "-".to_string(), |m| format!("{m:.4}"));
        println!(
            "{:<8} {:>8} {:>10.4} {:>10}",
            c,
            count,
            count as f64 / batch.len() as f64,
            mean
        );
    }

    Ok(())
}

/// Write a handful of evidence paths, skipping families that have none.
fn write_trajectories(sim: &Simulator, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut obs = SampleOutputObserver::new(CsvWriter::new(dir)?);
    match sim.trajectories(TRAJECTORY_DRAWS, &mut obs) {
        Ok(trajs) => {
            let steps: usize = trajs.iter().map(|t| t.steps()).sum();
            info!(draws = trajs.len(), steps, dir = %dir.display(), "trajectories written");
        }
        Err(SsmError::NoTrajectory(family)) => {
            info!(family = %family, "family has no evidence paths; skipping trajectories");
        }
        Err(e) => return Err(e.into()),
    }
    if let Some(e) = obs.take_error() {
        warn!(error = %e, "writing trajectories failed");
    }
    Ok(())
}
