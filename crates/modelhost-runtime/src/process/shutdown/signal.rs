//! Signal delivery by PID (no Child handle needed).

use modelhost_core::{ProcessSignaller, SignalError};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Delivers termination signals through the operating system.
///
/// # Platform behavior
/// - Unix: SIGTERM / SIGKILL via the nix crate; `ESRCH` maps to
///   [`SignalError::AlreadyExited`]
/// - Windows: `taskkill` without and with `/F`
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSignaller;

impl ProcessSignaller for OsSignaller {
    fn terminate(&self, pid: u32) -> Result<(), SignalError> {
        #[cfg(unix)]
        {
            send_unix(pid, Signal::SIGTERM)
        }

        #[cfg(not(unix))]
        {
            taskkill(pid, false)
        }
    }

    fn kill(&self, pid: u32) -> Result<(), SignalError> {
        #[cfg(unix)]
        {
            send_unix(pid, Signal::SIGKILL)
        }

        #[cfg(not(unix))]
        {
            taskkill(pid, true)
        }
    }
}

#[cfg(unix)]
fn send_unix(pid: u32, sig: Signal) -> Result<(), SignalError> {
    // PID 0 and negative values address process groups, never a single server.
    let raw = i32::try_from(pid)
        .ok()
        .filter(|raw| *raw > 0)
        .ok_or_else(|| SignalError::Failed(format!("refusing to signal PID {pid}")))?;

    match signal::kill(Pid::from_raw(raw), sig) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(SignalError::AlreadyExited),
        Err(e) => Err(SignalError::Failed(e.to_string())),
    }
}

#[cfg(not(unix))]
fn taskkill(pid: u32, force: bool) -> Result<(), SignalError> {
    let mut cmd = std::process::Command::new("taskkill");
    if force {
        cmd.arg("/F");
    }
    let output = cmd
        .arg("/PID")
        .arg(pid.to_string())
        .output()
        .map_err(|e| SignalError::Failed(e.to_string()))?;

    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.contains("not found") {
        Err(SignalError::AlreadyExited)
    } else {
        Err(SignalError::Failed(stderr.trim().to_string()))
    }
}
