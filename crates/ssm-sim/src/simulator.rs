//! The `Simulator` struct and its batch loops.

use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, warn};

use ssm_core::{
    DensityBatch, DrawId, DrawRng, ModelFamily, Outcome, OutcomeBatch, RunConfig, SsmError, SsmResult, Trajectory,
};
use ssm_models::{DynModel, Specification};

use crate::{CancelToken, SampleObserver};

/// Batch runner for one validated specification.
///
/// Every job is split into chunks of `RunConfig::chunk_size` items.  Within a
/// chunk, items run serially or (with the `parallel` feature) on Rayon; between
/// chunks the simulator reports progress and checks the cancel flag.  Results
/// are assembled in index order, so output never depends on how the work was
/// scheduled.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulator {
    model:  Arc<dyn DynModel>,
    spec:   Specification,
    config: RunConfig,
    cancel: CancelToken,

    /// Dedicated pool when `RunConfig::num_threads` is set; otherwise Rayon's
    /// global pool is used.
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl Simulator {
    pub(crate) fn new(
        model:  Arc<dyn DynModel>,
        spec:   Specification,
        config: RunConfig,
        cancel: CancelToken,
    ) -> SsmResult<Self> {
        #[cfg(feature = "parallel")]
        let pool = match config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SsmError::Config(format!("cannot start a {n}-thread pool: {e}")))?,
            ),
            None => None,
        };

        #[cfg(not(feature = "parallel"))]
        if let Some(n) = config.num_threads {
            debug!(num_threads = n, "built without the `parallel` feature; running serially");
        }

        Ok(Self {
            model,
            spec,
            config,
            cancel,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn family(&self) -> ModelFamily {
        self.spec.family()
    }

    pub fn spec(&self) -> &Specification {
        &self.spec
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    // ── Sampling ──────────────────────────────────────────────────────────

    /// Draw `n ≥ 1` outcomes.
    pub fn sample<O: SampleObserver>(&self, n: usize, observer: &mut O) -> SsmResult<OutcomeBatch> {
        check_count(n)?;
        let family = self.family();
        debug!(family = %family, n, seed = self.config.seed, "sampling batch");
        observer.on_batch_start(family, n);

        let mut batch = OutcomeBatch::with_capacity(n);
        for range in self.chunks(n) {
            let end = range.end;
            let outcomes = self.run_chunk(range, n, |i| {
                let mut rng = DrawRng::new(self.config.seed, DrawId(i as u64));
                self.model.sample(&self.spec, &mut rng, &self.config.sampler)
            })?;
            for outcome in outcomes {
                batch.push(outcome);
            }
            observer.on_progress(end, n);
        }

        debug!(family = %family, n, mean_rt = ?batch.mean_rt(), "batch finished");
        observer.on_batch_end(&batch);
        Ok(batch)
    }

    /// Draw `n ≥ 1` outcomes together with their evidence paths.
    ///
    /// Fails with `SsmError::NoTrajectory` for families without a path
    /// representation.  Trajectories reach
    /// [`SampleObserver::on_trajectory`] only once every chunk has succeeded,
    /// so a cancelled or exhausted job emits none of them.
    pub fn trajectories<O: SampleObserver>(&self, n: usize, observer: &mut O) -> SsmResult<Vec<Trajectory>> {
        check_count(n)?;
        let family = self.family();
        debug!(family = %family, n, seed = self.config.seed, dt = self.config.sampler.dt, "sampling trajectories");
        observer.on_batch_start(family, n);

        let mut out = Vec::with_capacity(n);
        for range in self.chunks(n) {
            let end = range.end;
            let chunk = self.run_chunk(range, n, |i| {
                let mut rng = DrawRng::new(self.config.seed, DrawId(i as u64));
                match self.model.trajectory(&self.spec, &mut rng, &self.config.sampler)? {
                    Some(mut t) => {
                        t.draw = DrawId(i as u64);
                        Ok(t)
                    }
                    None => Err(SsmError::NoTrajectory(family)),
                }
            })?;
            out.extend(chunk);
            observer.on_progress(end, n);
        }

        for t in &out {
            observer.on_trajectory(t);
        }

        let batch: OutcomeBatch = out.iter().map(|t| t.outcome).collect();
        debug!(family = %family, n, mean_rt = ?batch.mean_rt(), "trajectories finished");
        observer.on_batch_end(&batch);
        Ok(out)
    }

    // ── Density ───────────────────────────────────────────────────────────

    /// Log-density of every outcome, with the warnings of any truncated
    /// series.  Each warning is also logged.
    pub fn density_batch(&self, outcomes: &[Outcome]) -> SsmResult<DensityBatch> {
        let n = outcomes.len();
        let mut evals = Vec::with_capacity(n);
        for range in self.chunks(n) {
            evals.extend(self.run_chunk(range, n, |i| {
                self.model.log_density(&self.spec, outcomes[i], &self.config.density)
            })?);
        }

        let batch = DensityBatch::from_evals(evals);
        for (index, w) in &batch.warnings {
            warn!(
                index,
                family = %w.family,
                terms = w.terms,
                next_term = w.last_term,
                tolerance = w.tolerance,
                "density series truncated before reaching tolerance"
            );
        }
        Ok(batch)
    }

    /// Per-outcome density, or log-density when `log` is true.
    pub fn density(&self, outcomes: &[Outcome], log: bool) -> SsmResult<Vec<f64>> {
        let batch = self.density_batch(outcomes)?;
        Ok(if log { batch.log_densities } else { batch.densities() })
    }

    /// Sum of log-densities (i.i.d. log-likelihood).
    pub fn log_likelihood(&self, outcomes: &[Outcome]) -> SsmResult<f64> {
        Ok(self.density_batch(outcomes)?.log_likelihood())
    }

    // ── Chunk execution ───────────────────────────────────────────────────

    fn chunks(&self, n: usize) -> impl Iterator<Item = Range<usize>> {
        let size = self.config.chunk_size;
        (0..n).step_by(size).map(move |start| start..(start + size).min(n))
    }

    /// Run `item` for every index of `range`, in order of index.
    ///
    /// The cancel flag is checked before each item; the first failing index
    /// (in index order) decides the error, and `completed` in a
    /// `Cancelled` error counts the items before it.
    fn run_chunk<T, F>(&self, range: Range<usize>, requested: usize, item: F) -> SsmResult<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> SsmResult<T> + Sync,
    {
        let guarded = |i: usize| {
            if self.cancel.is_cancelled() {
                return Err(SsmError::Cancelled { completed: i, requested });
            }
            item(i)
        };

        #[cfg(not(feature = "parallel"))]
        {
            range.map(guarded).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let results: Vec<SsmResult<T>> = self.install(|| range.into_par_iter().map(guarded).collect());
            results.into_iter().collect()
        }
    }

    #[cfg(feature = "parallel")]
    fn install<R: Send>(&self, job: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(job),
            None => job(),
        }
    }
}

fn check_count(n: usize) -> SsmResult<()> {
    if n == 0 {
        return Err(SsmError::Config("requested draw count must be >= 1".into()));
    }
    Ok(())
}
