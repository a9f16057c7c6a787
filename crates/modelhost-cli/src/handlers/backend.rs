//! Backend provisioning handlers: detect, install, download, instructions.

use anyhow::Result;
use modelhost_core::{BackendInstallation, BackendKind, default_port_for_name};
use modelhost_runtime::installation_instructions;

use crate::bootstrap::CliContext;

/// Report installation state for one backend, or all of them.
pub async fn detect(ctx: &CliContext, backend: Option<BackendKind>, json: bool) -> Result<()> {
    let backends = backend.map_or_else(|| BackendKind::ALL.to_vec(), |kind| vec![kind]);

    let mut found = Vec::with_capacity(backends.len());
    for kind in backends {
        found.push(ctx.installer.detect(kind).await);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        for installation in &found {
            println!("{}", format_installation(installation));
        }
    }
    Ok(())
}

/// Install `backend`, streaming progress lines to stdout.
pub async fn install(ctx: &CliContext, backend: BackendKind) -> Result<()> {
    let progress = |line: &str| println!("{line}");
    let message = ctx.installer.install(backend, Some(&progress)).await?;
    println!("✓ {message}");
    Ok(())
}

/// Stage `model` for `backend` with the backend's own downloader.
pub async fn download(ctx: &CliContext, backend: BackendKind, model: &str) -> Result<()> {
    let progress = |line: &str| println!("{line}");
    let downloaded = ctx
        .installer
        .download(backend, model, Some(&progress))
        .await?;
    println!("✓ {}", downloaded.message());
    Ok(())
}

pub fn instructions(backend: BackendKind) {
    println!("{}", installation_instructions(backend));
}

pub fn default_port(name: &str) {
    println!("{}", default_port_for_name(name));
}

/// One-line summary, e.g. `✓ llama.cpp version: 4567 (/opt/homebrew/bin/llama-server)`.
pub fn format_installation(installation: &BackendInstallation) -> String {
    let name = installation.backend.display_name();
    if !installation.installed {
        return format!("✗ {name} not installed");
    }

    let mut line = format!("✓ {name}");
    if let Some(version) = &installation.version {
        line.push(' ');
        line.push_str(version);
    }
    if let Some(path) = &installation.path {
        line.push_str(&format!(" ({})", path.display()));
    }
    line
}
