//! Batch observer trait for progress reporting and data collection.

use ssm_core::{ModelFamily, OutcomeBatch, Trajectory};

/// Callbacks invoked by the [`Simulator`][crate::Simulator] while it runs a
/// sampling job.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Hooks always run on the calling thread, in
/// draw order, even with the `parallel` feature.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SampleObserver for Progress {
///     fn on_progress(&mut self, completed: usize, requested: usize) {
///         println!("{completed}/{requested} draws");
///     }
/// }
/// ```
pub trait SampleObserver {
    /// Called once before the first draw.
    fn on_batch_start(&mut self, _family: ModelFamily, _requested: usize) {}

    /// Called after every completed chunk.
    fn on_progress(&mut self, _completed: usize, _requested: usize) {}

    /// Called for each trajectory in trajectory mode, in draw order.
    fn on_trajectory(&mut self, _trajectory: &Trajectory) {}

    /// Called once with the finished batch.  Not called for a failed or
    /// cancelled job.
    fn on_batch_end(&mut self, _batch: &OutcomeBatch) {}
}

/// A [`SampleObserver`] that does nothing.
pub struct NoopObserver;

impl SampleObserver for NoopObserver {}
