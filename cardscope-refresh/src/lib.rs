pub mod backoff;
pub mod pool;
pub mod orchestrator;
pub mod scheduler;
pub mod provider;

pub use backoff::{run_with_retry, BackoffPolicy, RetryOutcome, Sleeper, TokioSleeper};
pub use orchestrator::{RefreshOrchestrator, RefreshSummary};
pub use pool::WorkerPool;
pub use provider::OpenAiRewardProvider;
pub use scheduler::RefreshScheduler;

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Worker pool is closed")]
    PoolClosed,
    #[error("Store error: {0}")]
    StoreError(String),
    #[error("Provider client error: {0}")]
    ClientError(String),
}
