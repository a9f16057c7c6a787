//! Port probe trait definition.

use async_trait::async_trait;

/// Reports whether a TCP port on the local host is bound.
///
/// Implementations never fail: when the host cannot be queried they answer
/// according to their configured
/// [`ProbeFailurePolicy`](crate::settings::ProbeFailurePolicy).
#[async_trait]
pub trait PortProbe: Send + Sync {
    async fn is_port_in_use(&self, port: u16) -> bool;
}
