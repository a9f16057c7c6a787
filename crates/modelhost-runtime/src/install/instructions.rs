//! Manual installation instructions per backend.

use modelhost_core::BackendKind;

const MLX_LM: &str = "\
To install MLX-LM (optimized for Apple Silicon):

1. Create a virtual environment (recommended):
   python3 -m venv ~/.venv/modelhost
   source ~/.venv/modelhost/bin/activate

2. Install MLX-LM:
   pip install mlx-lm

3. Verify installation:
   python3 -c \"import mlx_lm; print('MLX-LM installed successfully')\"

MLX-LM provides the best performance on Apple Silicon devices.";

const LLAMA_CPP: &str = "\
To install llama.cpp server:

Using Homebrew (macOS/Linux):
   brew install llama.cpp

Or build from source:
   git clone https://github.com/ggerganov/llama.cpp
   cd llama.cpp
   make

llama.cpp provides excellent performance with GGUF models.";

const OLLAMA: &str = "\
To install Ollama:

Using Homebrew (macOS/Linux):
   brew install ollama

Or download from: https://ollama.ai

Ollama provides the easiest model management experience.";

/// Step-by-step manual installation text for `backend`.
pub fn installation_instructions(backend: BackendKind) -> &'static str {
    match backend {
        BackendKind::MlxLm => MLX_LM,
        BackendKind::LlamaCpp => LLAMA_CPP,
        BackendKind::Ollama => OLLAMA,
    }
}
