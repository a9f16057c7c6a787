//! Process runtime for modelhost backends.
//!
//! This crate implements the ports defined in `modelhost-core` against the
//! host OS and wires them into [`BackendManager`], the server lifecycle
//! manager, and [`BackendInstaller`], the detection/installation/download
//! collaborator.

#![deny(unsafe_code)]

pub mod health;
pub mod install;
pub mod launch;
mod manager;
pub mod process;
mod shell;
mod terminate;

pub use health::MarkerHealthPolicy;
pub use install::{BackendInstaller, installation_instructions};
pub use launch::{LaunchPlan, OLLAMA_SERVE_COMMAND, resolve_launch_plan};
pub use manager::BackendManager;
pub use process::{OsSignaller, ProcessRegistry, TcpPortProbe, TokioProcessSpawner};
pub use shell::ShellCommandRunner;
