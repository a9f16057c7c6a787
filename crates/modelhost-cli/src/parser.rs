//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Start, stop and provision local model servers (MLX-LM, llama.cpp, Ollama).
#[derive(Parser)]
#[command(name = "modelhost")]
#[command(about = "Run local model servers for MLX-LM, llama.cpp and Ollama")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is not set.
    pub const fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "modelhost=debug,modelhost_runtime=debug,modelhost_cli=debug"
        } else {
            "warn"
        }
    }
}
