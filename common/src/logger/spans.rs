use tracing::Span;

use super::RunId;

/// Root span for one benchmark run.
pub fn run_span(run_id: &RunId) -> Span {
    tracing::info_span!("run", run_id = %run_id)
}

/// Child span for one worker task (inherits the run id from its parent).
pub fn worker_span(worker_id: usize) -> Span {
    tracing::info_span!("worker", worker_id)
}
