//! Load progress hooks.
//!
//! CSV exports don't state their row count, so the loader reports a running
//! record count and a final tally instead of a fraction.

use std::sync::Arc;

/// Observes one dataset load.
pub trait LoadProgress: Send + Sync {
    /// The loader has read the header row of `dataset`.
    fn started(&self, dataset: &str);

    /// One CSV record was read (kept or skipped).
    fn record_read(&self);

    /// Every record has been read.
    fn finished(&self, kept: usize, skipped: usize);
}

/// Ignores every event.
pub struct NoProgress;

impl LoadProgress for NoProgress {
    fn started(&self, _dataset: &str) {}
    fn record_read(&self) {}
    fn finished(&self, _kept: usize, _skipped: usize) {}
}

/// Shared [`NoProgress`] for callers that don't display anything.
#[must_use]
pub fn no_progress() -> Arc<dyn LoadProgress> {
    Arc::new(NoProgress)
}
