//! Core domain types and port definitions for modelhost.
//!
//! This crate owns the vocabulary shared by the server lifecycle manager and
//! the installation collaborator: backend kinds, server configuration, tracked
//! server state, structured errors, and the port traits that runtime adapters
//! implement. It performs no I/O of its own.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    ALL_GPU_LAYERS, BackendInstallation, BackendKind, DEFAULT_CONTEXT_SIZE, DownloadedModel,
    FALLBACK_PORT, HealthSignal, OLLAMA_PORT, ParseBackendError, ServerConfiguration, ServerId,
    ServerStatus, StartedServer, StopOutcome, TrackedServer, default_port, default_port_for_name,
    recommended_config,
};
pub use error::{BackendError, InstallError};
pub use ports::{
    CommandOutput, CommandRunner, ExitReport, HealthPolicy, LaunchCommand, OutputReader,
    OutputSink, OutputStream, PortProbe, ProcessSignaller, ProcessSpawner, SignalError,
    SpawnedProcess,
};
pub use settings::{ManagerSettings, ProbeFailurePolicy, ReadinessPolicy, SettingsError};
