//! Serve command handler.
//!
//! Starts one backend server, streams its output, and stops everything the
//! manager tracks on Ctrl-C.

use anyhow::Result;
use modelhost_core::{
    BackendError, BackendKind, OutputSink, ServerConfiguration, ServerId, recommended_config,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::bootstrap::CliContext;

/// How often to check whether the served process is still tracked.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Arguments for the serve command.
pub struct ServeArgs {
    pub backend: BackendKind,
    pub model: PathBuf,
    pub port: Option<u16>,
    pub ctx_size: Option<u32>,
    pub gpu_layers: Option<u32>,
}

impl ServeArgs {
    /// Recommended configuration with any explicit overrides applied.
    pub fn configuration(&self) -> ServerConfiguration {
        let mut config = recommended_config(self.backend, &self.model);
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(size) = self.ctx_size {
            config = config.with_context_size(size);
        }
        if let Some(layers) = self.gpu_layers {
            config = config.with_gpu_layers(layers);
        }
        config
    }
}

/// Execute the serve command.
pub async fn execute(ctx: &CliContext, args: ServeArgs) -> Result<()> {
    let config = args.configuration();
    let sink: Arc<dyn OutputSink> = Arc::new(|line: &str| println!("{line}"));

    let started = match ctx.manager.start_server(&config, Some(sink)).await {
        Ok(started) => started,
        Err(err) => {
            if let BackendError::VerificationFailed { id, .. } = &err {
                reclaim(ctx, *id).await;
            }
            return Err(err.into());
        }
    };
    println!("✓ {}", started.message());
    let id = started.server.id;

    if started.server.is_system_service() {
        println!("Server will be available on http://localhost:{}", started.server.port);
        return Ok(());
    }

    println!("Server will be available on http://localhost:{}", config.port);
    println!("Press Ctrl-C to stop.");

    let mut ticker = interval(EXIT_POLL_INTERVAL);
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl-C; stopping now");
                }
                break;
            }
            _ = ticker.tick() => {
                if ctx.manager.server(id).is_none() {
                    info!(id = %id, "Server process is gone");
                    return Ok(());
                }
            }
        }
    }

    println!("Stopping servers...");
    for (id, result) in ctx.manager.stop_all_servers().await {
        match result {
            Ok(outcome) => println!("{id}: {}", outcome.message()),
            Err(e) => eprintln!("{id}: {e}"),
        }
    }
    Ok(())
}

/// Stop a server that spawned but never came up, so it does not outlive the
/// command.
async fn reclaim(ctx: &CliContext, id: ServerId) {
    match ctx.manager.stop_server(id).await {
        Ok(outcome) => {
            info!(id = %id, outcome = %outcome.message(), "Stopped server that failed to start");
        }
        // Already reaped by the exit watcher.
        Err(BackendError::ServerNotFound { .. }) => {}
        Err(e) => warn!(id = %id, error = %e, "Failed to stop server that failed to start"),
    }
}
