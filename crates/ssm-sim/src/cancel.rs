//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag checked by the simulator between draws and between density
/// chunks.  Clones observe the same flag.
///
/// A cancelled job returns `SsmError::Cancelled` and drops everything it had
/// produced; no draw is interrupted midway.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear the flag so the token can guard another job.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}
