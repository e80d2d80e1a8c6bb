//! `SampleOutputObserver<W>` bridges `SampleObserver` to an `OutputWriter`.

use ssm_core::{OutcomeBatch, Trajectory};
use ssm_sim::SampleObserver;

use crate::row::{OutcomeRow, TrajectoryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SampleObserver`] that writes trajectories as they arrive and the
/// outcome batch when it completes, then finishes the writer.
///
/// Errors from the writer are stored internally because `SampleObserver`
/// methods have no return value.  After the job returns, check for errors
/// with [`take_error`][Self::take_error].
pub struct SampleOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SampleOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after the job returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the job).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SampleObserver for SampleOutputObserver<W> {
    fn on_trajectory(&mut self, trajectory: &Trajectory) {
        let rows = TrajectoryRow::from_trajectory(trajectory);
        let result = self.writer.write_trajectory(&rows);
        self.store_err(result);
    }

    fn on_batch_end(&mut self, batch: &OutcomeBatch) {
        let rows = OutcomeRow::from_batch(batch);
        let result = self.writer.write_outcomes(&rows);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
