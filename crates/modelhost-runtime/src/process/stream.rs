//! Output and exit observers for spawned servers (non-UTF8-safe).
//!
//! Backend servers (llama.cpp in particular) can emit non-UTF8 bytes on
//! stdout/stderr. `BufReader::lines()` would end the reader on invalid UTF-8,
//! so lines are read as bytes and decoded lossily.

use modelhost_core::{ExitReport, HealthPolicy, OutputReader, OutputSink, OutputStream, ServerId};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::registry::ProcessRegistry;

/// Turns one server's output and exit into registry transitions and sink
/// messages.
pub(crate) struct OutputObserver {
    id: ServerId,
    port: u16,
    registry: Arc<ProcessRegistry>,
    policy: Arc<dyn HealthPolicy>,
    sink: Option<Arc<dyn OutputSink>>,
}

impl OutputObserver {
    pub(crate) fn new(
        id: ServerId,
        port: u16,
        registry: Arc<ProcessRegistry>,
        policy: Arc<dyn HealthPolicy>,
        sink: Option<Arc<dyn OutputSink>>,
    ) -> Self {
        Self {
            id,
            port,
            registry,
            policy,
            sink,
        }
    }

    /// Forward `line` and apply any health signal it carries.
    pub(crate) fn observe(&self, stream: OutputStream, line: &str) {
        debug!(id = %self.id, port = %self.port, stream = stream.as_str(), "{}", line);

        if let Some(sink) = &self.sink {
            sink.emit(line);
        }

        if let Some(signal) = self.policy.classify(stream, line) {
            self.registry
                .update_status(self.id, |status| status.on_signal(signal));
        }
    }

    /// Record process exit: the entry becomes `stopped` and is dropped.
    pub(crate) fn exited(&self, report: ExitReport) {
        let removed = self.registry.mark_exited(self.id);

        let message = match report.code {
            Some(0) => "Server exited with code 0".to_string(),
            Some(code) => format!("Server exited with code {code} (error)"),
            None => "Server exited without an exit code (error)".to_string(),
        };

        if report.success() {
            info!(id = %self.id, port = %self.port, tracked = removed.is_some(), "Server exited");
        } else {
            warn!(id = %self.id, port = %self.port, code = ?report.code, tracked = removed.is_some(), "Server exited with error");
        }

        if let Some(sink) = &self.sink {
            sink.emit(&message);
        }
    }
}

/// Read `stream` line by line until EOF, feeding each line to `observer`.
pub(crate) fn spawn_stream_reader(
    stream: OutputReader,
    kind: OutputStream,
    observer: Arc<OutputObserver>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }
                    let line = String::from_utf8_lossy(&buf);
                    observer.observe(kind, &line);
                }
                Err(e) => {
                    debug!(id = %observer.id, stream = kind.as_str(), error = %e, "output reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(id = %observer.id, stream = kind.as_str(), "output reader task exiting");
    })
}

/// Wait for the process to exit and report it to `observer`.
///
/// A dropped exit sender counts as an exit with unknown code.
pub(crate) fn spawn_exit_watcher(
    exit: oneshot::Receiver<ExitReport>,
    observer: Arc<OutputObserver>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let report = exit.await.unwrap_or(ExitReport { code: None });
        observer.exited(report);
    })
}
