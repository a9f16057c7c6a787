//! Default ports and recommended server configurations.

use std::path::PathBuf;

use super::backend::{BackendKind, FALLBACK_PORT};
use super::server::{ALL_GPU_LAYERS, DEFAULT_CONTEXT_SIZE, ServerConfiguration};

/// Default port for a backend.
#[must_use]
pub const fn default_port(backend: BackendKind) -> u16 {
    backend.default_port()
}

/// Default port for a backend named by its wire name.
///
/// Unknown names resolve to [`FALLBACK_PORT`].
#[must_use]
pub fn default_port_for_name(name: &str) -> u16 {
    name.parse::<BackendKind>()
        .map_or(FALLBACK_PORT, BackendKind::default_port)
}

/// Recommended configuration for serving `model_path` with `backend`.
pub fn recommended_config(
    backend: BackendKind,
    model_path: impl Into<PathBuf>,
) -> ServerConfiguration {
    ServerConfiguration::new(backend, model_path, default_port(backend))
        .with_context_size(DEFAULT_CONTEXT_SIZE)
        .with_gpu_layers(ALL_GPU_LAYERS)
}
