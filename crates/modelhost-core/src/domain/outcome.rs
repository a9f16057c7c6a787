//! Success results of lifecycle operations.

use serde::Serialize;

use super::server::TrackedServer;

/// A server that passed startup verification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedServer {
    /// Snapshot of the registry entry at the moment of success.
    pub server: TrackedServer,
}

impl StartedServer {
    pub const fn new(server: TrackedServer) -> Self {
        Self { server }
    }

    /// Human-readable success message.
    pub fn message(&self) -> String {
        if self.server.is_system_service() {
            "Ollama service is running".to_string()
        } else {
            format!(
                "{} server started successfully on port {}",
                self.server.backend, self.server.port
            )
        }
    }
}

/// Result of a stop request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StopOutcome {
    /// The process was signalled and removed from tracking.
    Stopped,
    /// The target is a shared system service and was deliberately left alone.
    LeftRunning { message: String },
}

impl StopOutcome {
    /// Outcome for a stop request aimed at the shared Ollama service.
    pub fn system_service() -> Self {
        Self::LeftRunning {
            message: "Ollama service is system-wide. Use \"ollama stop\" manually if needed."
                .to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Stopped => "Server stopped successfully",
            Self::LeftRunning { message } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BackendKind;
    use std::path::Path;

    #[test]
    fn test_started_message_names_backend_and_port() {
        let server = TrackedServer::starting(BackendKind::MlxLm, 10, 8081, Path::new("m"));
        let started = StartedServer::new(server);
        assert_eq!(
            started.message(),
            "mlx-lm server started successfully on port 8081"
        );
    }

    #[test]
    fn test_started_message_for_service() {
        let started = StartedServer::new(TrackedServer::system_service(Path::new("llama3")));
        assert_eq!(started.message(), "Ollama service is running");
    }

    #[test]
    fn test_stop_outcome_messages() {
        assert_eq!(StopOutcome::Stopped.message(), "Server stopped successfully");
        assert!(StopOutcome::system_service().message().contains("ollama stop"));
    }
}
