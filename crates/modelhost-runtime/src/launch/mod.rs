//! Server launcher.
//!
//! Starting a server runs these steps in order:
//! 1. Reject the request if the target port is already bound (nothing spawned
//!    or launched, for every backend)
//! 2. Resolve the per-backend launch plan
//! 3. Spawn with piped output and register a `starting` entry keyed by PID
//! 4. Attach stdout/stderr readers and an exit watcher for the process lifetime
//! 5. Wait according to the readiness policy
//! 6. Re-probe the port: bound → `running`, otherwise → `error`
//!
//! A server that fails step 6 keeps running and stays registered in the
//! `error` state; the caller decides whether to stop it.

mod plan;

pub use plan::{LaunchPlan, OLLAMA_SERVE_COMMAND, resolve_launch_plan};

use modelhost_core::{
    BackendError, HealthSignal, LaunchCommand, OLLAMA_PORT, OutputSink, OutputStream,
    ServerConfiguration, ServerId, ServerStatus, StartedServer, TrackedServer,
};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::manager::BackendManager;
use crate::process::{OutputObserver, spawn_exit_watcher, spawn_stream_reader};

impl BackendManager {
    /// Start a backend server for `config`.
    ///
    /// All captured output is forwarded to `output` as it arrives.
    pub async fn start_server(
        &self,
        config: &ServerConfiguration,
        output: Option<Arc<dyn OutputSink>>,
    ) -> Result<StartedServer, BackendError> {
        if self.probe.is_port_in_use(config.port).await {
            warn!(port = %config.port, backend = %config.backend, "Refusing to start: port already in use");
            return Err(BackendError::PortInUse { port: config.port });
        }

        match resolve_launch_plan(config, &self.settings) {
            LaunchPlan::SystemService { command_line } => {
                Ok(self.ensure_system_service(config, command_line).await)
            }
            LaunchPlan::Spawn(command) => self.spawn_and_verify(config, &command, output).await,
        }
    }

    /// Record the Ollama service as running, nudging it up if needed.
    ///
    /// The serve command is fire-and-forget: its outcome never changes the
    /// result. It is skipped when the service port is already bound, which
    /// can only happen when `config.port` is some other port.
    async fn ensure_system_service(
        &self,
        config: &ServerConfiguration,
        command_line: &str,
    ) -> StartedServer {
        // `config.port` was already found free; only a different port needs probing.
        let already_up =
            config.port != OLLAMA_PORT && self.probe.is_port_in_use(OLLAMA_PORT).await;
        if already_up {
            info!(port = %OLLAMA_PORT, "Ollama service already listening");
        } else if let Err(e) = self.commands.launch_detached(command_line).await {
            warn!(command = %command_line, error = %e, "Failed to issue serve command; recording service anyway");
        } else {
            debug!(command = %command_line, "Issued serve command");
        }

        let entry = TrackedServer::system_service(&config.model_path);
        self.registry.register(entry.clone());
        StartedServer::new(entry)
    }

    async fn spawn_and_verify(
        &self,
        config: &ServerConfiguration,
        command: &LaunchCommand,
        output: Option<Arc<dyn OutputSink>>,
    ) -> Result<StartedServer, BackendError> {
        if let Some(sink) = &output {
            sink.emit(&format!(
                "Starting {} server on port {}...",
                config.backend, config.port
            ));
        }

        info!(backend = %config.backend, port = %config.port, command = %command, "Spawning backend server");
        let spawned = self
            .spawner
            .spawn(command)
            .map_err(|e| BackendError::spawn_failed(config.backend, e))?;
        let pid = spawned.pid.ok_or(BackendError::MissingProcessId {
            backend: config.backend,
        })?;

        let entry = TrackedServer::starting(config.backend, pid, config.port, &config.model_path);
        let id = entry.id;
        self.registry.register(entry);

        let observer = Arc::new(OutputObserver::new(
            id,
            config.port,
            Arc::clone(&self.registry),
            Arc::clone(&self.health),
            output,
        ));
        if let Some(stdout) = spawned.stdout {
            spawn_stream_reader(stdout, OutputStream::Stdout, Arc::clone(&observer));
        }
        if let Some(stderr) = spawned.stderr {
            spawn_stream_reader(stderr, OutputStream::Stderr, Arc::clone(&observer));
        }
        spawn_exit_watcher(spawned.exit, observer);

        self.verify_startup(config, id).await
    }

    /// Poll the port per the readiness policy and settle the entry's status.
    async fn verify_startup(
        &self,
        config: &ServerConfiguration,
        id: ServerId,
    ) -> Result<StartedServer, BackendError> {
        let policy = self.settings.readiness;

        for attempt in 1..=policy.max_attempts {
            sleep(policy.interval()).await;

            if !self.registry.contains(id) {
                debug!(id = %id, attempt, "Process exited during startup");
                break;
            }

            if self.probe.is_port_in_use(config.port).await {
                if let Some(server) = self
                    .registry
                    .update_status(id, |status| status.on_signal(HealthSignal::Ready))
                {
                    info!(id = %id, port = %config.port, backend = %config.backend, "Server is listening");
                    return Ok(StartedServer::new(server));
                }
                break;
            }

            debug!(id = %id, port = %config.port, attempt, max_attempts = policy.max_attempts, "Port not bound yet");
        }

        self.registry.update_status(id, |status| match status {
            ServerStatus::Stopping | ServerStatus::Stopped => status,
            _ => ServerStatus::Error,
        });
        warn!(id = %id, port = %config.port, backend = %config.backend, "Server did not bind its port");
        Err(BackendError::VerificationFailed {
            backend: config.backend,
            port: config.port,
            id,
        })
    }
}
