//! Shell command runner trait definition.

use async_trait::async_trait;
use std::io;

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the command exited with status 0.
    pub success: bool,
    /// Exit code, if the command was not terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Set stderr on an existing output.
    #[must_use]
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }
}

/// Runs command lines through the platform shell.
///
/// Command lines are passed verbatim so that backend tooling sees exactly
/// the documented invocations.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command_line` to completion and capture its output.
    ///
    /// Returns `Err` only if the shell itself could not be started.
    async fn run(&self, command_line: &str) -> io::Result<CommandOutput>;

    /// Start `command_line` without waiting for it to finish.
    async fn launch_detached(&self, command_line: &str) -> io::Result<()>;
}
