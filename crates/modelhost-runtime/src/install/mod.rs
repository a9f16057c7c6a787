//! Backend detection, installation and model download.
//!
//! Everything here shells out to fixed command lines and inspects their text
//! output. The command strings are kept exactly as the backends document
//! them, except that the Python interpreter and the llama.cpp server binary
//! follow the same settings the launcher uses.

mod instructions;

pub use instructions::installation_instructions;

use modelhost_core::settings::{DEFAULT_LLAMA_SERVER_PROGRAM, DEFAULT_PYTHON_PROGRAM};
use modelhost_core::{
    BackendInstallation, BackendKind, CommandOutput, CommandRunner, DownloadedModel, InstallError,
    ManagerSettings, OutputSink,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::shell::ShellCommandRunner;

const OLLAMA_VERSION: &str = "ollama --version";

const MLX_INSTALL: &str = "pip install mlx-lm";
const BREW_LOCATE: &str = "which brew";
const LLAMA_INSTALL: &str = "brew install llama.cpp";
const OLLAMA_INSTALL: &str = "brew install ollama";

/// Detects, installs and stages models for backends via their own tooling.
///
/// No timeouts are applied: a hung package manager hangs the call.
pub struct BackendInstaller {
    runner: Arc<dyn CommandRunner>,
    python_program: String,
    llama_server_program: String,
}

impl Default for BackendInstaller {
    fn default() -> Self {
        Self::new(Arc::new(ShellCommandRunner))
    }
}

impl BackendInstaller {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            python_program: DEFAULT_PYTHON_PROGRAM.to_string(),
            llama_server_program: DEFAULT_LLAMA_SERVER_PROGRAM.to_string(),
        }
    }

    /// Use the interpreter and server binary configured for the launcher,
    /// so detection checks the programs that will actually be started.
    #[must_use]
    pub fn with_programs(mut self, settings: &ManagerSettings) -> Self {
        self.python_program.clone_from(&settings.python_program);
        self.llama_server_program.clone_from(&settings.llama_server_program);
        self
    }

    /// Report whether `backend` is installed. Never fails.
    pub async fn detect(&self, backend: BackendKind) -> BackendInstallation {
        let installation = match backend {
            BackendKind::MlxLm => self.detect_mlx().await,
            BackendKind::LlamaCpp => self.detect_llama_cpp().await,
            BackendKind::Ollama => self.detect_ollama().await,
        };
        debug!(backend = %backend, installed = installation.installed, version = ?installation.version, "Detected backend");
        installation
    }

    async fn detect_mlx(&self) -> BackendInstallation {
        let command = format!("{} -m pip show mlx-lm", self.python_program);
        match self.run_ok(&command).await {
            Some(output) => {
                let version = output
                    .stdout
                    .lines()
                    .find_map(|line| line.strip_prefix("Version: "))
                    .map(|v| v.trim().to_string());
                BackendInstallation::present(BackendKind::MlxLm, version)
            }
            None => BackendInstallation::missing(BackendKind::MlxLm),
        }
    }

    async fn detect_llama_cpp(&self) -> BackendInstallation {
        let program = &self.llama_server_program;
        let Some(located) = self.run_ok(&format!("which {program}")).await else {
            return BackendInstallation::missing(BackendKind::LlamaCpp);
        };
        // The version query is optional; older builds do not support it.
        let version = self
            .run_ok(&format!("{program} --version"))
            .await
            .and_then(|output| version_text(&output));

        let installation = BackendInstallation::present(BackendKind::LlamaCpp, version);
        match located.stdout.trim() {
            "" => installation,
            path => installation.with_path(path),
        }
    }

    async fn detect_ollama(&self) -> BackendInstallation {
        match self.run_ok(OLLAMA_VERSION).await {
            Some(output) => {
                BackendInstallation::present(BackendKind::Ollama, version_text(&output))
            }
            None => BackendInstallation::missing(BackendKind::Ollama),
        }
    }

    /// Install `backend` with its package manager.
    ///
    /// Returns the success message; progress goes to `progress`.
    pub async fn install(
        &self,
        backend: BackendKind,
        progress: Option<&dyn OutputSink>,
    ) -> Result<String, InstallError> {
        report(progress, &format!("Installing {backend}..."));

        match backend {
            BackendKind::MlxLm => {
                report(progress, "Installing MLX-LM via pip...");
                let output = self.run(MLX_INSTALL).await?;
                check_install(&output, |stderr| stderr.contains("Successfully installed"))?;
            }
            BackendKind::LlamaCpp | BackendKind::Ollama => {
                report(progress, "Checking for Homebrew...");
                if self.run_ok(BREW_LOCATE).await.is_none() {
                    warn!(backend = %backend, "Homebrew not found");
                    return Err(InstallError::PackageManagerMissing {
                        hint: homebrew_hint(backend),
                    });
                }

                report(
                    progress,
                    &format!("Installing {} via Homebrew...", backend.display_name()),
                );
                let command = if backend == BackendKind::LlamaCpp {
                    LLAMA_INSTALL
                } else {
                    OLLAMA_INSTALL
                };
                let output = self.run(command).await?;
                check_install(&output, |stderr| stderr.to_lowercase().contains("success"))?;
            }
        }

        let name = backend.display_name();
        report(progress, &format!("{name} installed successfully!"));
        info!(backend = %backend, "Backend installed");
        Ok(format!("{name} installed successfully"))
    }

    /// Stage `model_name` with the backend's own downloader.
    pub async fn download(
        &self,
        backend: BackendKind,
        model_name: &str,
        progress: Option<&dyn OutputSink>,
    ) -> Result<DownloadedModel, InstallError> {
        match backend {
            BackendKind::LlamaCpp => {
                return Err(InstallError::ManualDownloadRequired { backend });
            }
            BackendKind::MlxLm => {
                validate_model_name(model_name)?;
                report(progress, &format!("Downloading MLX model: {model_name}..."));
                // MLX downloads on first load, so loading once caches the model.
                let command = format!(
                    "{} -c \"from mlx_lm import load; load('{model_name}')\"",
                    self.python_program
                );
                let output = self.run(&command).await?;
                check_download(&output, |stderr| !stderr.contains("Loading"))?;
            }
            BackendKind::Ollama => {
                validate_model_name(model_name)?;
                report(progress, &format!("Downloading Ollama model: {model_name}..."));
                let output = self.run(&format!("ollama pull {model_name}")).await?;
                check_download(&output, |stderr| stderr.to_lowercase().contains("error"))?;
            }
        }

        report(progress, "Model downloaded successfully!");
        info!(backend = %backend, model = %model_name, "Model downloaded");
        Ok(DownloadedModel {
            backend,
            model_path: model_name.to_string(),
        })
    }

    async fn run(&self, command: &str) -> Result<CommandOutput, InstallError> {
        self.runner
            .run(command)
            .await
            .map_err(|e| InstallError::io(command, e))
    }

    /// Run `command`, keeping the output only if it exited successfully.
    async fn run_ok(&self, command: &str) -> Option<CommandOutput> {
        match self.runner.run(command).await {
            Ok(output) if output.success => Some(output),
            Ok(output) => {
                debug!(command = %command, code = ?output.code, "Command exited unsuccessfully");
                None
            }
            Err(e) => {
                debug!(command = %command, error = %e, "Command could not be run");
                None
            }
        }
    }
}

fn report(progress: Option<&dyn OutputSink>, message: &str) {
    if let Some(sink) = progress {
        sink.emit(message);
    }
}

fn homebrew_hint(backend: BackendKind) -> &'static str {
    match backend {
        BackendKind::Ollama => "Please install Ollama manually from https://ollama.ai",
        _ => "Please install llama.cpp manually or install Homebrew first.",
    }
}

/// First line of a version query, from stdout or (as some tools do) stderr.
fn version_text(output: &CommandOutput) -> Option<String> {
    let text = if output.stdout.trim().is_empty() {
        &output.stderr
    } else {
        &output.stdout
    };
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

fn failure_text(output: &CommandOutput) -> String {
    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    match output.code {
        Some(code) => format!("command exited with code {code}"),
        None => "command was terminated by a signal".to_string(),
    }
}

/// Fail on a non-zero exit, or on stderr noise that lacks a success marker.
fn check_install(
    output: &CommandOutput,
    reports_success: impl Fn(&str) -> bool,
) -> Result<(), InstallError> {
    if !output.success {
        return Err(InstallError::InstallFailed(failure_text(output)));
    }
    if !output.stderr.is_empty() && !reports_success(&output.stderr) {
        return Err(InstallError::InstallFailed(output.stderr.clone()));
    }
    Ok(())
}

/// Fail on a non-zero exit, or when stderr matches `is_failure`.
fn check_download(
    output: &CommandOutput,
    is_failure: impl Fn(&str) -> bool,
) -> Result<(), InstallError> {
    if !output.success {
        return Err(InstallError::DownloadFailed(failure_text(output)));
    }
    if !output.stderr.is_empty() && is_failure(&output.stderr) {
        return Err(InstallError::DownloadFailed(output.stderr.clone()));
    }
    Ok(())
}

/// Model names are spliced into shell lines, so only accept repository-style
/// identifiers.
fn validate_model_name(name: &str) -> Result<(), InstallError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '@'));
    if valid {
        Ok(())
    } else {
        Err(InstallError::DownloadFailed(format!(
            "invalid model name: {name:?}"
        )))
    }
}
