//! Shell command execution for backend tooling.

use async_trait::async_trait;
use modelhost_core::{CommandOutput, CommandRunner};
use std::io;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs command lines through `sh -c` (or `cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellCommandRunner;

fn shell_command(command_line: &str) -> Command {
    #[cfg(unix)]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command_line);
        cmd
    }

    #[cfg(not(unix))]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command_line);
        cmd
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, command_line: &str) -> io::Result<CommandOutput> {
        debug!(command = %command_line, "Running command");
        let output = shell_command(command_line)
            .stdin(Stdio::null())
            .output()
            .await?;

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(command = %command_line, code = ?result.code, "Command finished");
        Ok(result)
    }

    async fn launch_detached(&self, command_line: &str) -> io::Result<()> {
        debug!(command = %command_line, "Launching detached command");
        let mut child = shell_command(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        // Reap the shell in the background; whatever it backgrounded is not ours.
        let line = command_line.to_string();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(command = %line, status = %status, "Detached command exited"),
                Err(e) => {
                    debug!(command = %line, error = %e, "Failed to wait for detached command");
                }
            }
        });
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_streams_and_status() {
        let output = ShellCommandRunner
            .run("echo out; echo err 1>&2; exit 2")
            .await
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(2));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_run_missing_command_is_unsuccessful() {
        let output = ShellCommandRunner
            .run("definitely_not_a_real_command_12345 --version")
            .await
            .unwrap();
        assert!(!output.success);
    }

    #[tokio::test]
    async fn test_launch_detached_returns_immediately() {
        tokio_test::assert_ok!(ShellCommandRunner.launch_detached("sleep 0.1 &").await);
    }
}
