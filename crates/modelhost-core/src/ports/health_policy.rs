//! Health policy trait for output-based readiness detection.

use crate::domain::HealthSignal;

/// Which stream a line of server output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Classifies server output into health signals.
///
/// The port probe is the second, independent readiness signal; this trait
/// only covers text heuristics so a backend-specific check can replace them.
pub trait HealthPolicy: Send + Sync {
    /// Signal carried by `line`, if any.
    fn classify(&self, stream: OutputStream, line: &str) -> Option<HealthSignal>;
}
