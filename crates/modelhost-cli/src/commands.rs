//! Available subcommands.

use clap::Subcommand;
use modelhost_core::BackendKind;
use std::path::PathBuf;

/// Available commands for managing local model backends.
#[derive(Subcommand)]
pub enum Commands {
    /// Report which backends are installed
    Detect {
        /// Only check this backend (mlx-lm, llama-cpp, ollama)
        backend: Option<BackendKind>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Install a backend with its package manager
    Install {
        /// Backend to install (mlx-lm, llama-cpp, ollama)
        backend: BackendKind,
    },

    /// Download a model with the backend's own downloader
    Download {
        /// Backend that will serve the model
        backend: BackendKind,
        /// Model name (e.g. "mlx-community/Llama-3.2-3B-Instruct-4bit", "llama3.2")
        model: String,
    },

    /// Show manual installation steps for a backend
    Instructions {
        /// Backend to describe
        backend: BackendKind,
    },

    /// Print the default port for a backend name
    DefaultPort {
        /// Backend name; unknown names get the fallback port
        name: String,
    },

    /// Start a backend server and keep it running until Ctrl-C
    Serve {
        /// Backend to run
        backend: BackendKind,
        /// Model file path (llama.cpp) or model name (MLX-LM, Ollama)
        model: PathBuf,
        /// Port to serve on (defaults to the backend's default port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Context size for llama.cpp
        #[arg(long = "ctx-size")]
        ctx_size: Option<u32>,
        /// Number of layers to offload to the GPU for llama.cpp
        #[arg(long = "gpu-layers")]
        gpu_layers: Option<u32>,
    },
}
