//! Port for reporting council progress to the presentation layer.

use conclave_domain::Stage;

/// Progress notification interface for council runs.
///
/// The orchestrator calls these hooks as stages start, individual
/// participants finish, and stages complete. Implementations must be cheap
/// and non-blocking; they run on the orchestrator's task.
pub trait CouncilProgress: Send + Sync {
    /// Called when a stage begins, with the number of tasks it will run.
    fn on_stage_start(&self, stage: Stage, total_tasks: usize);

    /// Called when one participant's task finishes (successfully or not).
    fn on_task_complete(&self, stage: Stage, responder: &str, success: bool);

    /// Called when a stage has fully completed.
    fn on_stage_complete(&self, stage: Stage);
}

/// No-op implementation for headless runs and tests.
pub struct NoProgress;

impl CouncilProgress for NoProgress {
    fn on_stage_start(&self, _stage: Stage, _total_tasks: usize) {}
    fn on_task_complete(&self, _stage: Stage, _responder: &str, _success: bool) {}
    fn on_stage_complete(&self, _stage: Stage) {}
}
