//! Tokio-backed process spawning.

use modelhost_core::{ExitReport, LaunchCommand, OutputReader, ProcessSpawner, SpawnedProcess};
use std::io;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Spawns backend servers as child processes with piped stdout/stderr.
///
/// Each child is moved into a reaper task that waits on it and reports the
/// exit through the returned [`SpawnedProcess::exit`] channel, so exited
/// servers never linger as zombies.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessSpawner;

impl ProcessSpawner for TokioProcessSpawner {
    fn spawn(&self, command: &LaunchCommand) -> io::Result<SpawnedProcess> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn()?;
        let pid = child.id();
        debug!(pid = ?pid, command = %command, "Spawned process");

        let stdout = child
            .stdout
            .take()
            .map(|s| -> OutputReader { Box::pin(s) });
        let stderr = child
            .stderr
            .take()
            .map(|s| -> OutputReader { Box::pin(s) });

        let (exit_tx, exit_rx) = oneshot::channel();
        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(pid = ?pid, error = %e, "Failed to wait for process");
                    None
                }
            };
            // The receiver is gone only if the launcher was dropped mid-start.
            let _ = exit_tx.send(ExitReport { code });
        });

        Ok(SpawnedProcess {
            pid,
            stdout,
            stderr,
            exit: exit_rx,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_spawn_captures_output_and_exit_code() {
        let command = LaunchCommand::new("sh")
            .arg("-c")
            .arg("echo ready; echo oops 1>&2; exit 3");
        let spawned = TokioProcessSpawner.spawn(&command).unwrap();
        assert!(spawned.pid.is_some());

        let mut stdout = String::new();
        spawned
            .stdout
            .unwrap()
            .read_to_string(&mut stdout)
            .await
            .unwrap();
        let mut stderr = String::new();
        spawned
            .stderr
            .unwrap()
            .read_to_string(&mut stderr)
            .await
            .unwrap();

        assert_eq!(stdout.trim(), "ready");
        assert_eq!(stderr.trim(), "oops");
        assert_eq!(spawned.exit.await.unwrap(), ExitReport { code: Some(3) });
    }

    #[tokio::test]
    async fn test_spawn_missing_program_fails() {
        let command = LaunchCommand::new("definitely_not_a_real_command_12345");
        assert!(TokioProcessSpawner.spawn(&command).is_err());
    }
}
