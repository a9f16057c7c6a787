//! Process spawner trait definition.

use std::fmt;
use std::io;
use std::pin::Pin;
use tokio::io::AsyncRead;
use tokio::sync::oneshot;

/// Program and argument vector for a backend server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Readable half of a captured output stream.
pub type OutputReader = Pin<Box<dyn AsyncRead + Send>>;

/// How a spawned process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// Exit code; `None` when killed by a signal or when the wait failed.
    pub code: Option<i32>,
}

impl ExitReport {
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// A child process with captured output.
///
/// The spawner owns reaping: `exit` resolves once the OS reports the process
/// gone. A dropped sender is treated as an exit with unknown code.
pub struct SpawnedProcess {
    pub pid: Option<u32>,
    pub stdout: Option<OutputReader>,
    pub stderr: Option<OutputReader>,
    pub exit: oneshot::Receiver<ExitReport>,
}

/// Spawns backend server processes with piped stdout and stderr.
pub trait ProcessSpawner: Send + Sync {
    /// Spawn `command`. Must be called from within a tokio runtime.
    fn spawn(&self, command: &LaunchCommand) -> io::Result<SpawnedProcess>;
}
