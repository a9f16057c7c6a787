//! Composition root: builds the manager and installer from settings.

use anyhow::{Context, Result};
use modelhost_core::ManagerSettings;
use modelhost_runtime::{BackendInstaller, BackendManager};
use std::sync::Arc;
use tracing::debug;

/// Everything a handler needs.
pub struct CliContext {
    pub manager: Arc<BackendManager>,
    pub installer: BackendInstaller,
}

impl CliContext {
    pub fn new(settings: ManagerSettings) -> Self {
        let installer = BackendInstaller::default().with_programs(&settings);
        Self::with_manager(BackendManager::new(settings), installer)
    }

    /// Wrap an already configured manager.
    pub fn with_manager(manager: BackendManager, installer: BackendInstaller) -> Self {
        Self {
            manager: Arc::new(manager),
            installer,
        }
    }
}

/// Load `MODELHOST_*` settings from the environment and wire the OS adapters.
pub fn bootstrap() -> Result<CliContext> {
    let settings = ManagerSettings::from_env().context("Invalid MODELHOST_* configuration")?;
    debug!(?settings, "Loaded manager settings");
    Ok(CliContext::new(settings))
}
