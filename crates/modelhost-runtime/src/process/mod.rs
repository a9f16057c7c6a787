//! Process supervision infrastructure.
//!
//! # Structure
//!
//! - `ProcessRegistry` - shared map of tracked servers
//! - `TcpPortProbe` - detects bound TCP ports on the local host
//! - `TokioProcessSpawner` - spawns servers with piped output and reaps them
//! - `OsSignaller` / `shutdown` - SIGTERM then SIGKILL escalation by PID
//! - stream readers that turn output into status transitions

mod ports;
mod registry;
pub mod shutdown;
mod spawner;
mod stream;

pub use ports::TcpPortProbe;
pub use registry::ProcessRegistry;
pub use shutdown::{OsSignaller, terminate_then_kill};
pub use spawner::TokioProcessSpawner;
pub(crate) use stream::{OutputObserver, spawn_exit_watcher, spawn_stream_reader};
