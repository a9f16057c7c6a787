//! Server terminator: graceful-then-forced shutdown of tracked servers.

use futures_util::future::join_all;
use modelhost_core::{BackendError, ServerId, ServerStatus, SignalError, StopOutcome};
use tracing::{debug, info, warn};

use crate::manager::BackendManager;
use crate::process::terminate_then_kill;

impl BackendManager {
    /// Stop the server tracked under `id`.
    ///
    /// - Unknown `id`: `ServerNotFound`, nothing changes.
    /// - The Ollama service sentinel: nothing is signalled and the entry stays
    ///   tracked; the outcome tells the user to stop the service manually.
    /// - Otherwise: `stopping`, SIGTERM, grace period, SIGKILL (skipped if the
    ///   process exited meanwhile), and the entry is removed whether or not
    ///   the signals landed.
    pub async fn stop_server(&self, id: ServerId) -> Result<StopOutcome, BackendError> {
        let Some(entry) = self.registry.get(id) else {
            debug!(id = %id, "Stop requested for unknown server");
            return Err(BackendError::ServerNotFound { id });
        };

        if entry.is_system_service() {
            info!(port = %entry.port, "Leaving shared Ollama service running");
            return Ok(StopOutcome::system_service());
        }

        let Some(pid) = id.pid() else {
            self.registry.remove(id);
            return Err(BackendError::SignalFailed {
                id,
                message: "identifier does not name an OS process".to_string(),
            });
        };

        self.registry.update_status(id, |_| ServerStatus::Stopping);
        info!(pid = %pid, port = %entry.port, backend = %entry.backend, "Stopping server");

        // The exit watcher drops the entry once the child is reaped.
        let registry = &self.registry;
        let result = terminate_then_kill(
            self.signaller.as_ref(),
            pid,
            self.settings.grace_period(),
            || registry.contains(id),
        )
        .await;
        self.registry.remove(id);

        match result {
            Ok(()) | Err(SignalError::AlreadyExited) => {
                info!(pid = %pid, "Server stopped");
                Ok(StopOutcome::Stopped)
            }
            Err(SignalError::Failed(message)) => {
                warn!(pid = %pid, error = %message, "Failed to signal server");
                Err(BackendError::SignalFailed { id, message })
            }
        }
    }

    /// Stop every tracked server concurrently.
    ///
    /// Returns one outcome per identifier that was tracked when the call
    /// began, in no particular order.
    pub async fn stop_all_servers(&self) -> Vec<(ServerId, Result<StopOutcome, BackendError>)> {
        let ids = self.registry.ids();
        debug!(count = ids.len(), "Stopping all servers");

        let results = join_all(ids.iter().map(|&id| self.stop_server(id))).await;
        ids.into_iter().zip(results).collect()
    }
}
