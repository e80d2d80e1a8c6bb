//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OutcomeRow, OutputResult, TrajectoryRow};

/// Trait implemented by output backends.
///
/// All methods are infallible from the observer's perspective; errors are
/// stored internally and retrieved with
/// [`SampleOutputObserver::take_error`][crate::SampleOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of outcomes.
    fn write_outcomes(&mut self, rows: &[OutcomeRow]) -> OutputResult<()>;

    /// Write the rows of one trajectory.
    fn write_trajectory(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
