use thiserror::Error;
use tokio::task::JoinError;

use crate::parallel::ParallelError;

/// Errors that can occur while running a buffered pipeline.
///
/// Failures of storings, factories and processors are returned in the caller's own
/// error type; this enum covers what the pipeline itself can run into. A caller
/// without an error type of its own can use it directly via
/// [`PipelineError::ProcessorError`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Raised by a caller's storing, factory or pending result when it has no error
    /// type of its own. `source()` yields the wrapped error.
    #[error("storing rejected the data")]
    ProcessorError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A pending result task was cancelled before it completed.
    #[error("pending result task did not complete")]
    PendingTask(#[source] JoinError),

    #[error("configuration error: {0}")]
    Config(#[from] ParallelError),
}

impl PipelineError {
    pub fn processor<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PipelineError::ProcessorError(Box::new(err))
    }
}
