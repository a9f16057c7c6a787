//! TCP port probing for process management.

use async_trait::async_trait;
use modelhost_core::{PortProbe, ProbeFailurePolicy};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Upper bound on the connect attempt against a port.
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Detects LISTEN sockets on the loopback interface.
///
/// A port is in use if a connection to `127.0.0.1:port` is accepted, or if
/// binding that address fails with `AddrInUse`. Any other I/O failure is a
/// probe failure and is answered by the configured [`ProbeFailurePolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpPortProbe {
    failure_policy: ProbeFailurePolicy,
}

impl TcpPortProbe {
    pub const fn new(failure_policy: ProbeFailurePolicy) -> Self {
        Self { failure_policy }
    }

    pub const fn failure_policy(&self) -> ProbeFailurePolicy {
        self.failure_policy
    }

    /// Probe `port`, surfacing failures instead of applying the policy.
    pub async fn probe(&self, port: u16) -> io::Result<bool> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));

        match timeout(CONNECT_TIMEOUT, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => {
                debug!(port = %port, "Port accepted a connection");
                return Ok(true);
            }
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {}
            Ok(Err(e)) => debug!(port = %port, error = %e, "Connect probe failed, trying bind"),
            Err(_) => debug!(port = %port, "Connect probe timed out, trying bind"),
        }

        // The listener is dropped immediately, releasing the port.
        match TcpListener::bind(addr).await {
            Ok(_listener) => Ok(false),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => Ok(true),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl PortProbe for TcpPortProbe {
    async fn is_port_in_use(&self, port: u16) -> bool {
        match self.probe(port).await {
            Ok(in_use) => in_use,
            Err(e) => {
                let assumed = self.failure_policy.assume_in_use();
                warn!(
                    port = %port,
                    error = %e,
                    policy = ?self.failure_policy,
                    assumed_in_use = assumed,
                    "Could not determine port state"
                );
                assumed
            }
        }
    }
}
