//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the lifecycle manager expects from the host:
//! probing TCP ports, spawning and signalling processes, running shell
//! commands, classifying server output, and delivering output to callers.
//! Implementations live in `modelhost-runtime`; tests substitute fakes.

pub mod command_runner;
pub mod health_policy;
pub mod output_sink;
pub mod port_probe;
pub mod process_spawner;
pub mod signaller;

pub use command_runner::{CommandOutput, CommandRunner};
pub use health_policy::{HealthPolicy, OutputStream};
pub use output_sink::OutputSink;
pub use port_probe::PortProbe;
pub use process_spawner::{ExitReport, LaunchCommand, OutputReader, ProcessSpawner, SpawnedProcess};
pub use signaller::{ProcessSignaller, SignalError};
