//! Stage progress reporting.
//!
//! The pipeline reports one unit of work per completed stage through a
//! [`ProgressCallback`]. Rendering is left to the caller; the CLI plugs in
//! an `indicatif` bar, tests and library users pass [`null_progress`].

use std::sync::Arc;

/// Receives progress updates from a running analysis.
///
/// Implementations must be `Send + Sync` so a single reporter can be
/// shared behind an `Arc`.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of stages.
    fn set_total(&self, total: u64);

    /// Advances progress by `delta` stages.
    fn inc(&self, delta: u64);

    /// Updates the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
