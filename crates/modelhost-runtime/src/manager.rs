//! Server lifecycle manager for local model backends.

use modelhost_core::{
    CommandRunner, HealthPolicy, ManagerSettings, PortProbe, ProcessSignaller, ProcessSpawner,
    ServerId, TrackedServer,
};
use std::sync::Arc;

use crate::health::MarkerHealthPolicy;
use crate::process::{OsSignaller, ProcessRegistry, TcpPortProbe, TokioProcessSpawner};
use crate::shell::ShellCommandRunner;

/// Launches, tracks and stops backend servers.
///
/// Construct one at application startup and share it by reference or `Arc`.
/// Each manager owns its own [`ProcessRegistry`], so independent managers
/// (for example in tests) never see each other's servers.
///
/// Host interaction goes through the port traits from `modelhost-core`;
/// [`BackendManager::new`] wires the OS implementations and the `with_*`
/// methods swap individual ports.
///
/// Operations live next to their concerns: `start_server` in
/// [`crate::launch`], `stop_server` / `stop_all_servers` in the terminator.
pub struct BackendManager {
    pub(crate) registry: Arc<ProcessRegistry>,
    pub(crate) probe: Arc<dyn PortProbe>,
    pub(crate) spawner: Arc<dyn ProcessSpawner>,
    pub(crate) signaller: Arc<dyn ProcessSignaller>,
    pub(crate) commands: Arc<dyn CommandRunner>,
    pub(crate) health: Arc<dyn HealthPolicy>,
    pub(crate) settings: ManagerSettings,
}

impl BackendManager {
    /// Create a manager backed by the host OS.
    pub fn new(settings: ManagerSettings) -> Self {
        Self {
            registry: Arc::new(ProcessRegistry::new()),
            probe: Arc::new(TcpPortProbe::new(settings.probe_failure_policy)),
            spawner: Arc::new(TokioProcessSpawner),
            signaller: Arc::new(OsSignaller),
            commands: Arc::new(ShellCommandRunner),
            health: Arc::new(MarkerHealthPolicy),
            settings,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ProcessRegistry>) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_port_probe(mut self, probe: Arc<dyn PortProbe>) -> Self {
        self.probe = probe;
        self
    }

    #[must_use]
    pub fn with_spawner(mut self, spawner: Arc<dyn ProcessSpawner>) -> Self {
        self.spawner = spawner;
        self
    }

    #[must_use]
    pub fn with_signaller(mut self, signaller: Arc<dyn ProcessSignaller>) -> Self {
        self.signaller = signaller;
        self
    }

    #[must_use]
    pub fn with_command_runner(mut self, commands: Arc<dyn CommandRunner>) -> Self {
        self.commands = commands;
        self
    }

    #[must_use]
    pub fn with_health_policy(mut self, health: Arc<dyn HealthPolicy>) -> Self {
        self.health = health;
        self
    }

    pub const fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// Shared handle to this manager's registry.
    pub fn registry(&self) -> Arc<ProcessRegistry> {
        Arc::clone(&self.registry)
    }

    /// Snapshot of every tracked server.
    pub fn running_servers(&self) -> Vec<TrackedServer> {
        self.registry.list_all()
    }

    /// Snapshot of one tracked server.
    pub fn server(&self, id: ServerId) -> Option<TrackedServer> {
        self.registry.get(id)
    }
}

impl Default for BackendManager {
    fn default() -> Self {
        Self::new(ManagerSettings::default())
    }
}
