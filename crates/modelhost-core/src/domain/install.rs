//! Installation and download results reported by the backend collaborator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::backend::BackendKind;

/// Whether a backend runtime is present on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendInstallation {
    pub backend: BackendKind,
    pub installed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Location of the executable, when the detection command reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl BackendInstallation {
    pub const fn missing(backend: BackendKind) -> Self {
        Self {
            backend,
            installed: false,
            version: None,
            path: None,
        }
    }

    pub const fn present(backend: BackendKind, version: Option<String>) -> Self {
        Self {
            backend,
            installed: true,
            version,
            path: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// A model staged by a backend's own downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadedModel {
    pub backend: BackendKind,
    /// Name to pass as the model path when starting a server.
    pub model_path: String,
}

impl DownloadedModel {
    pub fn message(&self) -> String {
        let prefix = match self.backend {
            BackendKind::MlxLm => "MLX model",
            BackendKind::LlamaCpp => "GGUF model",
            BackendKind::Ollama => "Ollama model",
        };
        format!("{prefix} {} is ready", self.model_path)
    }
}
