use store::StoreError;
use thiserror::Error;

pub type BenchResult<T> = Result<T, BenchError>;

/// Conditions that end a run. Per-insert failures never surface here; they
/// are only reflected in the failed-operations counter.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("store setup failed: {0}")]
    Setup(#[source] StoreError),

    #[error("worker {worker_id} failed to connect, bailing: {source}")]
    WorkerConnect {
        worker_id: usize,
        #[source]
        source: StoreError,
    },

    #[error("worker task did not complete: {0}")]
    WorkerPanicked(#[from] tokio::task::JoinError),
}
