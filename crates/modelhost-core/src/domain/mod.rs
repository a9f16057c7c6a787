//! Domain types for backend kinds, server configuration and lifecycle state.

mod backend;
mod install;
mod outcome;
mod recommend;
mod server;

pub use backend::{BackendKind, FALLBACK_PORT, OLLAMA_PORT, ParseBackendError};
pub use install::{BackendInstallation, DownloadedModel};
pub use outcome::{StartedServer, StopOutcome};
pub use recommend::{default_port, default_port_for_name, recommended_config};
pub use server::{
    ALL_GPU_LAYERS, DEFAULT_CONTEXT_SIZE, HealthSignal, ServerConfiguration, ServerId,
    ServerStatus, TrackedServer,
};
