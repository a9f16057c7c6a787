//! Graceful process shutdown for backend servers.
//!
//! Servers are stopped by PID: SIGTERM, a fixed grace period, then SIGKILL
//! unless the process has been seen to exit in the meantime. Reaping is done
//! by the spawner's reaper task, after which the PID may be reused.

mod signal;

pub use signal::OsSignaller;

use modelhost_core::{ProcessSignaller, SignalError};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Stop `pid` with SIGTERM → grace period → SIGKILL.
///
/// `still_running` is consulted after the grace period. Once it reports
/// `false` the child has been reaped, so SIGKILL is skipped rather than sent
/// to a PID that may now belong to another process.
///
/// # Returns
/// - `Ok(())` once the signals were sent, or if the process was already gone
///   when SIGTERM was sent. A failed SIGKILL is never an error: the process
///   has most likely exited during the grace period.
/// - `Err(SignalError::Failed)` if SIGTERM could not be delivered to a live
///   process. No SIGKILL is attempted in that case.
pub async fn terminate_then_kill(
    signaller: &dyn ProcessSignaller,
    pid: u32,
    grace: Duration,
    still_running: impl Fn() -> bool,
) -> Result<(), SignalError> {
    match signaller.terminate(pid) {
        Ok(()) => {}
        Err(SignalError::AlreadyExited) => {
            debug!(pid = %pid, "Process already exited before SIGTERM");
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    sleep(grace).await;

    if !still_running() {
        debug!(pid = %pid, "Process exited during grace period; skipping SIGKILL");
        return Ok(());
    }

    match signaller.kill(pid) {
        Ok(()) => debug!(pid = %pid, "Sent SIGKILL after grace period"),
        Err(e) => debug!(pid = %pid, error = %e, "SIGKILL not delivered"),
    }

    Ok(())
}
