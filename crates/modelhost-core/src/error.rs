//! Error types for lifecycle and installation operations.
//!
//! Each variant's `Display` output is the message shown to the user, so
//! callers that only want text can use `to_string()` while callers that need
//! to branch can match on the variant.

use std::io;
use thiserror::Error;

use crate::domain::{BackendKind, ServerId};

/// Errors from starting or stopping backend servers.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The requested port was already bound before anything was spawned.
    #[error(
        "Port {port} is already in use. Please choose a different port or stop the existing server."
    )]
    PortInUse { port: u16 },

    /// The backend process could not be spawned.
    #[error("Failed to start {backend} server: {message}")]
    SpawnFailed {
        backend: BackendKind,
        message: String,
    },

    /// The OS did not report a process id for the spawned child.
    #[error("Failed to start {backend} server: spawned process has no PID")]
    MissingProcessId { backend: BackendKind },

    /// The process was spawned but its port never became bound.
    ///
    /// The process is left running and tracked in the `error` state.
    #[error("Server failed to start on port {port}. Check the logs for details.")]
    VerificationFailed {
        backend: BackendKind,
        port: u16,
        id: ServerId,
    },

    /// No tracked server has this identifier.
    #[error("No server found with PID {id}")]
    ServerNotFound { id: ServerId },

    /// Sending the termination signal failed for a reason other than the
    /// process having already exited.
    #[error("Failed to stop server {id}: {message}")]
    SignalFailed { id: ServerId, message: String },
}

impl BackendError {
    pub fn spawn_failed(backend: BackendKind, err: impl std::fmt::Display) -> Self {
        Self::SpawnFailed {
            backend,
            message: err.to_string(),
        }
    }
}

/// Errors from the installation and download collaborator.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The package manager needed for this backend is not available.
    #[error("Homebrew not found. {hint}")]
    PackageManagerMissing { hint: &'static str },

    /// The install command ran but reported failure.
    #[error("Installation failed: {0}")]
    InstallFailed(String),

    /// The download command ran but reported failure.
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// The backend has no downloader; the model must be fetched by hand.
    #[error("{} requires manual model download. Please download GGUF models from Hugging Face.", .backend.display_name())]
    ManualDownloadRequired { backend: BackendKind },

    /// The command could not be executed at all.
    #[error("Failed to run `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    pub fn io(command: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            command: command.into(),
            source,
        }
    }
}
