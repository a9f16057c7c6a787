//! Per-backend command resolution.

use modelhost_core::{BackendKind, LaunchCommand, ManagerSettings, ServerConfiguration};

/// Shell line that asks the Ollama daemon to come up.
pub const OLLAMA_SERVE_COMMAND: &str = "ollama serve &";

/// Python module that serves MLX-LM models.
const MLX_SERVER_MODULE: &str = "mlx_lm.server";

/// How a backend is brought up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPlan {
    /// Spawn and supervise a child process.
    Spawn(LaunchCommand),
    /// Nudge a system service with a fire-and-forget shell line; nothing is
    /// owned or supervised.
    SystemService { command_line: &'static str },
}

/// Resolve the launch plan for `config`.
///
/// Argument vectors are fixed per backend:
/// - MLX-LM: `python3 -m mlx_lm.server --model <path> --port <port>`
/// - llama.cpp: `llama-server -m <path> --port <port> --ctx-size <n> --n-gpu-layers <n>`
/// - Ollama: no argv, only [`OLLAMA_SERVE_COMMAND`]
pub fn resolve_launch_plan(config: &ServerConfiguration, settings: &ManagerSettings) -> LaunchPlan {
    let model = config.model_path.to_string_lossy();
    let port = config.port.to_string();

    match config.backend {
        BackendKind::MlxLm => LaunchPlan::Spawn(
            LaunchCommand::new(&settings.python_program)
                .arg("-m")
                .arg(MLX_SERVER_MODULE)
                .arg("--model")
                .arg(model)
                .arg("--port")
                .arg(port),
        ),
        BackendKind::LlamaCpp => LaunchPlan::Spawn(
            LaunchCommand::new(&settings.llama_server_program)
                .arg("-m")
                .arg(model)
                .arg("--port")
                .arg(port)
                .arg("--ctx-size")
                .arg(config.effective_context_size().to_string())
                .arg("--n-gpu-layers")
                .arg(config.effective_gpu_layers().to_string()),
        ),
        BackendKind::Ollama => LaunchPlan::SystemService {
            command_line: OLLAMA_SERVE_COMMAND,
        },
    }
}
