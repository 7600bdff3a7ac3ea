use thiserror::Error;

use crate::core::error::OrchestratorCoreError;
use crate::worker::DispatchError;

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Failures of the `orchestrator` binary's commands
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Setup failed: {0}")]
    OrchestratorCoreError(#[from] OrchestratorCoreError),

    #[error("Dispatcher invocation failed: {0}")]
    DispatchError(#[from] DispatchError),

    /// The processed job failed; carries the processor's message
    #[error("Job processing failed: {0}")]
    ProcessCommandError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
