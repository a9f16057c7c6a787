//! Backend kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Port used by backends that do not pick their own, and by unknown kinds.
pub const FALLBACK_PORT: u16 = 8080;

/// Well-known port of the Ollama system service.
pub const OLLAMA_PORT: u16 = 11434;

/// Local inference backend that can host a model.
///
/// The wire name (`mlx-lm`, `llama-cpp`, `ollama`) is used for serde,
/// `Display` and `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// MLX-LM, optimized for Apple Silicon.
    MlxLm,
    /// llama.cpp `llama-server` for GGUF models.
    LlamaCpp,
    /// Ollama, a daemonized local model service.
    Ollama,
}

impl BackendKind {
    /// Every supported backend, in presentation order.
    pub const ALL: [Self; 3] = [Self::MlxLm, Self::LlamaCpp, Self::Ollama];

    /// Stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MlxLm => "mlx-lm",
            Self::LlamaCpp => "llama-cpp",
            Self::Ollama => "ollama",
        }
    }

    /// Human-facing product name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::MlxLm => "MLX-LM",
            Self::LlamaCpp => "llama.cpp",
            Self::Ollama => "Ollama",
        }
    }

    /// Port the backend listens on unless told otherwise.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::MlxLm | Self::LlamaCpp => FALLBACK_PORT,
            Self::Ollama => OLLAMA_PORT,
        }
    }

    /// Whether the backend runs as a shared OS service rather than a child
    /// process owned by the manager.
    #[must_use]
    pub const fn is_system_service(self) -> bool {
        matches!(self, Self::Ollama)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown backend: {0}")]
pub struct ParseBackendError(pub String);

impl FromStr for BackendKind {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mlx-lm" | "mlx" => Ok(Self::MlxLm),
            "llama-cpp" | "llama.cpp" | "llamacpp" => Ok(Self::LlamaCpp),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ParseBackendError(s.to_string())),
        }
    }
}
