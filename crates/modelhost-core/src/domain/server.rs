//! Server configuration and tracked server state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::backend::{BackendKind, OLLAMA_PORT};

/// Context window used when the caller does not choose one.
pub const DEFAULT_CONTEXT_SIZE: u32 = 8192;

/// GPU layer count that asks the backend to offload every layer it can.
pub const ALL_GPU_LAYERS: u32 = 999;

/// Configuration for starting a backend server.
///
/// Built by the caller or by [`recommended_config`](super::recommended_config)
/// and never mutated once handed to the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfiguration {
    /// Backend that will host the model.
    pub backend: BackendKind,
    /// Path (or, for MLX-LM and Ollama, repository name) of the model.
    pub model_path: PathBuf,
    /// TCP port the server should bind.
    pub port: u16,
    /// Context window size; [`DEFAULT_CONTEXT_SIZE`] when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_size: Option<u32>,
    /// Layers to offload to the GPU; [`ALL_GPU_LAYERS`] when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_layers: Option<u32>,
}

impl ServerConfiguration {
    /// Create a configuration with the required fields.
    pub fn new(backend: BackendKind, model_path: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            backend,
            model_path: model_path.into(),
            port,
            context_size: None,
            gpu_layers: None,
        }
    }

    /// Set the context size.
    #[must_use]
    pub const fn with_context_size(mut self, size: u32) -> Self {
        self.context_size = Some(size);
        self
    }

    /// Set the number of GPU layers.
    #[must_use]
    pub const fn with_gpu_layers(mut self, layers: u32) -> Self {
        self.gpu_layers = Some(layers);
        self
    }

    /// Context size after applying the default.
    #[must_use]
    pub fn effective_context_size(&self) -> u32 {
        self.context_size.unwrap_or(DEFAULT_CONTEXT_SIZE)
    }

    /// GPU layer count after applying the default.
    #[must_use]
    pub fn effective_gpu_layers(&self) -> u32 {
        self.gpu_layers.unwrap_or(ALL_GPU_LAYERS)
    }
}

/// Identifier of a tracked server.
///
/// Positive values are OS process ids. [`ServerId::SYSTEM_SERVICE`] marks an
/// entry for a system service the manager does not own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(i64);

impl ServerId {
    /// Sentinel for "no specific process is owned".
    pub const SYSTEM_SERVICE: Self = Self(-1);

    /// Identifier for a spawned OS process.
    #[must_use]
    pub fn from_pid(pid: u32) -> Self {
        Self(i64::from(pid))
    }

    /// The OS process id, if this identifier names a real process.
    #[must_use]
    pub fn pid(self) -> Option<u32> {
        u32::try_from(self.0).ok()
    }

    #[must_use]
    pub const fn is_system_service(self) -> bool {
        self.0 == Self::SYSTEM_SERVICE.0
    }

    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for ServerId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signal derived from a line of server output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthSignal {
    /// The server reported that it is ready to serve.
    Ready,
    /// The server reported an error.
    Failed,
}

/// Lifecycle status of a tracked server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// Spawned, not yet confirmed healthy
    Starting,
    /// Ready marker seen or port confirmed bound
    Running,
    /// Termination accepted, signals in flight
    Stopping,
    /// Process exited or termination completed
    Stopped,
    /// Error output seen or startup verification failed
    Error,
}

impl ServerStatus {
    /// Whether output heuristics may still change this status.
    ///
    /// Once a stop has begun, late output must not resurrect the entry.
    #[must_use]
    pub const fn accepts_output_signals(self) -> bool {
        matches!(self, Self::Starting | Self::Running | Self::Error)
    }

    /// Status after applying an output-derived signal.
    #[must_use]
    pub const fn on_signal(self, signal: HealthSignal) -> Self {
        if !self.accepts_output_signals() {
            return self;
        }
        match signal {
            HealthSignal::Ready => Self::Running,
            HealthSignal::Failed => Self::Error,
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// A server the manager believes is alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedServer {
    pub backend: BackendKind,
    /// Process id, or [`ServerId::SYSTEM_SERVICE`]
    pub id: ServerId,
    pub port: u16,
    pub model_path: PathBuf,
    pub status: ServerStatus,
    /// When the manager started tracking the server
    pub started_at: DateTime<Utc>,
}

impl TrackedServer {
    /// Entry for a freshly spawned child process.
    pub fn starting(backend: BackendKind, pid: u32, port: u16, model_path: &Path) -> Self {
        Self {
            backend,
            id: ServerId::from_pid(pid),
            port,
            model_path: model_path.to_path_buf(),
            status: ServerStatus::Starting,
            started_at: Utc::now(),
        }
    }

    /// Sentinel entry for the Ollama system service.
    pub fn system_service(model_path: &Path) -> Self {
        Self {
            backend: BackendKind::Ollama,
            id: ServerId::SYSTEM_SERVICE,
            port: OLLAMA_PORT,
            model_path: model_path.to_path_buf(),
            status: ServerStatus::Running,
            started_at: Utc::now(),
        }
    }

    /// Whether this entry stands for a shared service the manager must not kill.
    #[must_use]
    pub const fn is_system_service(&self) -> bool {
        self.backend.is_system_service() && self.id.is_system_service()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_defaults() {
        let config = ServerConfiguration::new(BackendKind::LlamaCpp, "/models/a.gguf", 9000);
        assert_eq!(config.effective_context_size(), DEFAULT_CONTEXT_SIZE);
        assert_eq!(config.effective_gpu_layers(), ALL_GPU_LAYERS);

        let config = config.with_context_size(4096).with_gpu_layers(20);
        assert_eq!(config.effective_context_size(), 4096);
        assert_eq!(config.effective_gpu_layers(), 20);
    }

    #[test]
    fn test_server_id_pid() {
        assert_eq!(ServerId::from_pid(4242).pid(), Some(4242));
        assert_eq!(ServerId::SYSTEM_SERVICE.pid(), None);
        assert!(ServerId::from(-1).is_system_service());
    }

    #[test]
    fn test_signals_move_starting_server() {
        assert_eq!(
            ServerStatus::Starting.on_signal(HealthSignal::Ready),
            ServerStatus::Running
        );
        assert_eq!(
            ServerStatus::Starting.on_signal(HealthSignal::Failed),
            ServerStatus::Error
        );
        assert_eq!(
            ServerStatus::Running.on_signal(HealthSignal::Failed),
            ServerStatus::Error
        );
    }

    #[test]
    fn test_signals_are_ignored_once_stopping() {
        for status in [ServerStatus::Stopping, ServerStatus::Stopped] {
            assert_eq!(status.on_signal(HealthSignal::Ready), status);
            assert_eq!(status.on_signal(HealthSignal::Failed), status);
        }
    }

    #[test]
    fn test_signals_are_idempotent() {
        let once = ServerStatus::Starting.on_signal(HealthSignal::Ready);
        assert_eq!(once.on_signal(HealthSignal::Ready), once);
        let failed = ServerStatus::Starting.on_signal(HealthSignal::Failed);
        assert_eq!(failed.on_signal(HealthSignal::Failed), failed);
    }

    #[test]
    fn test_tracked_server_serialization() {
        let server = TrackedServer::starting(
            BackendKind::LlamaCpp,
            77,
            8080,
            Path::new("/models/a.gguf"),
        );
        let json = serde_json::to_string(&server).unwrap();
        assert!(json.contains("\"backend\":\"llama-cpp\""));
        assert!(json.contains("\"id\":77"));
        assert!(json.contains("\"status\":\"starting\""));
        assert!(json.contains("\"modelPath\":\"/models/a.gguf\""));
    }

    #[test]
    fn test_system_service_entry() {
        let server = TrackedServer::system_service(Path::new("llama3"));
        assert!(server.is_system_service());
        assert_eq!(server.port, OLLAMA_PORT);
        assert_eq!(server.status, ServerStatus::Running);
    }
}
