//! Process signalling trait definition.

use thiserror::Error;

/// Failure to deliver a signal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// No process with that id exists any more.
    #[error("process has already exited")]
    AlreadyExited,

    /// The signal could not be delivered (permissions, unsupported platform).
    #[error("{0}")]
    Failed(String),
}

/// Sends termination signals to OS processes by id.
pub trait ProcessSignaller: Send + Sync {
    /// Ask the process to exit (SIGTERM on Unix).
    fn terminate(&self, pid: u32) -> Result<(), SignalError>;

    /// Force the process to exit (SIGKILL on Unix).
    fn kill(&self, pid: u32) -> Result<(), SignalError>;
}
