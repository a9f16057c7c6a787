//! Output-based health heuristics for backend servers.

use modelhost_core::{HealthPolicy, HealthSignal, OutputStream};

/// Case-sensitive markers that mean the server is accepting requests.
const READY_MARKERS: [&str; 2] = ["ready", "listening"];

/// Case-insensitive marker that means the server hit an error (stderr only).
const ERROR_MARKER: &str = "error";

/// Default text heuristics shared by all backends.
///
/// - stdout or stderr containing `ready` or `listening` → [`HealthSignal::Ready`]
/// - stderr containing `error` in any case → [`HealthSignal::Failed`], which
///   wins over a readiness marker on the same line
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerHealthPolicy;

impl HealthPolicy for MarkerHealthPolicy {
    fn classify(&self, stream: OutputStream, line: &str) -> Option<HealthSignal> {
        if stream == OutputStream::Stderr && line.to_lowercase().contains(ERROR_MARKER) {
            return Some(HealthSignal::Failed);
        }
        if READY_MARKERS.iter().any(|marker| line.contains(marker)) {
            return Some(HealthSignal::Ready);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(stream: OutputStream, line: &str) -> Option<HealthSignal> {
        MarkerHealthPolicy.classify(stream, line)
    }

    #[test]
    fn test_ready_markers_on_either_stream() {
        assert_eq!(
            classify(OutputStream::Stdout, "server listening on port 8080"),
            Some(HealthSignal::Ready)
        );
        assert_eq!(
            classify(OutputStream::Stderr, "model ready"),
            Some(HealthSignal::Ready)
        );
    }

    #[test]
    fn test_ready_markers_are_case_sensitive() {
        assert_eq!(classify(OutputStream::Stdout, "Server READY"), None);
        assert_eq!(classify(OutputStream::Stdout, "Listening"), None);
    }

    #[test]
    fn test_error_marker_only_on_stderr() {
        assert_eq!(
            classify(OutputStream::Stderr, "ERROR: out of memory"),
            Some(HealthSignal::Failed)
        );
        assert_eq!(classify(OutputStream::Stdout, "error counters reset"), None);
    }

    #[test]
    fn test_error_wins_over_ready_on_stderr() {
        assert_eq!(
            classify(OutputStream::Stderr, "error: listening socket closed"),
            Some(HealthSignal::Failed)
        );
    }

    #[test]
    fn test_plain_lines_carry_no_signal() {
        assert_eq!(classify(OutputStream::Stdout, "loading tensors 12/40"), None);
    }
}
