//! Manager settings and validation.
//!
//! Settings are plain data with defaults that reproduce the historical
//! behaviour: a single two-second settle wait after spawn, a two-second grace
//! period between SIGTERM and SIGKILL, and a port probe that fails open.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default wait between spawn and port verification.
pub const DEFAULT_SETTLE_INTERVAL_MS: u64 = 2000;

/// Default number of port verification attempts.
pub const DEFAULT_SETTLE_ATTEMPTS: u32 = 1;

/// Default wait between SIGTERM and SIGKILL.
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 2000;

/// Default interpreter used to run MLX-LM.
pub const DEFAULT_PYTHON_PROGRAM: &str = "python3";

/// Default llama.cpp server executable.
pub const DEFAULT_LLAMA_SERVER_PROGRAM: &str = "llama-server";

/// Prefix shared by all environment overrides.
const ENV_PREFIX: &str = "MODELHOST_";

/// Errors raised while loading or validating settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("{0}")]
    Invalid(String),
}

/// What the port prober reports when it cannot determine a port's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeFailurePolicy {
    /// Treat the port as free. Favors availability; a bound port may be missed.
    #[default]
    FailOpen,
    /// Treat the port as bound. Favors correctness; a free port may be refused.
    FailClosed,
}

impl ProbeFailurePolicy {
    /// Answer to give for a port whose state could not be determined.
    #[must_use]
    pub const fn assume_in_use(self) -> bool {
        matches!(self, Self::FailClosed)
    }
}

impl std::str::FromStr for ProbeFailurePolicy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-open" | "open" => Ok(Self::FailOpen),
            "fail-closed" | "closed" => Ok(Self::FailClosed),
            _ => Err(SettingsError::InvalidValue {
                key: "probe_failure_policy".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// How long to wait for a freshly spawned server to bind its port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessPolicy {
    /// Delay before each probe, in milliseconds.
    pub interval_ms: u64,
    /// Number of probes before giving up (at least 1).
    pub max_attempts: u32,
}

impl ReadinessPolicy {
    /// Intervals beyond `u64::MAX` milliseconds saturate.
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            max_attempts,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_SETTLE_INTERVAL_MS,
            max_attempts: DEFAULT_SETTLE_ATTEMPTS,
        }
    }
}

/// Settings for the server lifecycle manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerSettings {
    /// Post-spawn verification policy.
    pub readiness: ReadinessPolicy,
    /// Wait between the graceful and the forced termination signal.
    pub grace_period_ms: u64,
    /// Port probe behaviour when the host cannot be queried.
    pub probe_failure_policy: ProbeFailurePolicy,
    /// Interpreter used to launch `mlx_lm.server`.
    pub python_program: String,
    /// Executable used to launch llama.cpp.
    pub llama_server_program: String,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            readiness: ReadinessPolicy::default(),
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
            probe_failure_policy: ProbeFailurePolicy::default(),
            python_program: DEFAULT_PYTHON_PROGRAM.to_string(),
            llama_server_program: DEFAULT_LLAMA_SERVER_PROGRAM.to_string(),
        }
    }
}

impl ManagerSettings {
    #[must_use]
    pub const fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// Load settings from `MODELHOST_*` environment variables over defaults.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup over defaults.
    ///
    /// Recognised keys: `MODELHOST_SETTLE_INTERVAL_MS`,
    /// `MODELHOST_SETTLE_ATTEMPTS`, `MODELHOST_GRACE_PERIOD_MS`,
    /// `MODELHOST_PROBE_FAILURE_POLICY`, `MODELHOST_PYTHON`,
    /// `MODELHOST_LLAMA_SERVER`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut settings = Self::default();

        if let Some(value) = get("SETTLE_INTERVAL_MS") {
            settings.readiness.interval_ms = parse_number("SETTLE_INTERVAL_MS", &value)?;
        }
        if let Some(value) = get("SETTLE_ATTEMPTS") {
            settings.readiness.max_attempts = parse_number("SETTLE_ATTEMPTS", &value)?;
        }
        if let Some(value) = get("GRACE_PERIOD_MS") {
            settings.grace_period_ms = parse_number("GRACE_PERIOD_MS", &value)?;
        }
        if let Some(value) = get("PROBE_FAILURE_POLICY") {
            settings.probe_failure_policy = value.parse()?;
        }
        if let Some(value) = get("PYTHON") {
            settings.python_program = value;
        }
        if let Some(value) = get("LLAMA_SERVER") {
            settings.llama_server_program = value;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.readiness.max_attempts == 0 {
            return Err(SettingsError::Invalid(
                "readiness.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.python_program.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "python_program must not be empty".to_string(),
            ));
        }
        if self.llama_server_program.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "llama_server_program must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
    value
        .trim()
        .parse()
        .map_err(|_| SettingsError::InvalidValue {
            key: format!("{ENV_PREFIX}{key}"),
            value: value.to_string(),
        })
}
