//! Tunable numerical and run-time settings.
//!
//! All three structs have documented defaults and a `validate` method; the
//! simulator validates its `RunConfig` once at build time.

use crate::{SsmError, SsmResult};

// ── SamplerConfig ─────────────────────────────────────────────────────────────

/// Settings for the random deviate generators.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplerConfig {
    /// Euler step (seconds) for discretised evidence paths.  Default: 1e-3.
    ///
    /// Crossings are only detected at step ends, so first-passage times are
    /// biased upward by a term of order `σ·√dt` (the overshoot past the
    /// boundary) relative to the continuous-time process.
    pub dt: f64,

    /// Maximum Euler steps per draw before giving up with
    /// `SsmError::SamplingExhaustion`.  Default: 1,000,000.
    pub max_steps: u64,

    /// Maximum redraws of a non-positive LBA drift rate per accumulator.
    /// Default: 1,000.
    pub max_redraws: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            dt:          1e-3,
            max_steps:   1_000_000,
            max_redraws: 1_000,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> SsmResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SsmError::Config(format!("sampler dt must be finite and > 0, got {}", self.dt)));
        }
        if self.max_steps == 0 {
            return Err(SsmError::Config("sampler max_steps must be >= 1".into()));
        }
        if self.max_redraws == 0 {
            return Err(SsmError::Config("sampler max_redraws must be >= 1".into()));
        }
        Ok(())
    }
}

// ── DensityConfig ─────────────────────────────────────────────────────────────

/// Settings for series-expansion densities (DDM first-passage time).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DensityConfig {
    /// Summation stops once the bound on the next term is below
    /// `series_tolerance * |partial sum|`.  Default: 1e-7.
    pub series_tolerance: f64,

    /// Hard cap on accumulated terms; reaching it attaches a
    /// `NumericalWarning` to the result.  Default: 1,000.
    pub max_terms: usize,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            series_tolerance: 1e-7,
            max_terms:        1_000,
        }
    }
}

impl DensityConfig {
    pub fn validate(&self) -> SsmResult<()> {
        if !(self.series_tolerance.is_finite() && self.series_tolerance > 0.0 && self.series_tolerance < 1.0) {
            return Err(SsmError::Config(format!(
                "density series_tolerance must be in (0, 1), got {}",
                self.series_tolerance
            )));
        }
        if self.max_terms == 0 {
            return Err(SsmError::Config("density max_terms must be >= 1".into()));
        }
        Ok(())
    }
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

/// Top-level configuration for a batch job.
///
/// Typically loaded from a JSON/TOML file by the application crate (with the
/// `serde` feature) and handed to the simulator builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunConfig {
    /// Master seed.  The same seed always produces identical batches,
    /// whatever the thread count.
    pub seed: u64,

    /// Worker thread count for the `parallel` feature.  `None` uses Rayon's
    /// global pool (all logical cores).
    pub num_threads: Option<usize>,

    /// Draws (or density evaluations) per work unit.  Cancellation and
    /// progress callbacks are checked at chunk granularity in parallel mode.
    pub chunk_size: usize,

    pub sampler: SamplerConfig,
    pub density: DensityConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed:        0,
            num_threads: None,
            chunk_size:  1_024,
            sampler:     SamplerConfig::default(),
            density:     DensityConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }

    pub fn validate(&self) -> SsmResult<()> {
        if self.chunk_size == 0 {
            return Err(SsmError::Config("chunk_size must be >= 1".into()));
        }
        if self.num_threads == Some(0) {
            return Err(SsmError::Config("num_threads must be >= 1 when set".into()));
        }
        self.sampler.validate()?;
        self.density.validate()
    }
}
