//! Progress reporting hooks
//!
//! These traits let callers observe a fan-out without the engine
//! depending on any particular terminal UI.

/// Progress callback for fan-out operations
///
/// Implement this trait to receive progress updates while steps run.
pub trait ProgressCallback {
    /// Called once before the first step runs
    fn on_start(&mut self, total: usize);

    /// Called after each step finishes
    ///
    /// # Arguments
    /// * `key` - The key of the step that just finished
    /// * `remaining` - Steps still to run, already decremented for this one
    /// * `succeeded` - Whether the step returned without a failure
    fn on_step_complete(&mut self, key: &str, remaining: usize, succeeded: bool);

    /// Called once after the last step, before the result is handed back
    fn on_finish(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&mut self, _total: usize) {}
    fn on_step_complete(&mut self, _key: &str, _remaining: usize, _succeeded: bool) {}
    fn on_finish(&mut self) {}
}
