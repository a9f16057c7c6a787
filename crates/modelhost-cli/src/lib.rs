//! Command-line front end for modelhost.
//!
//! Parsing lives in [`parser`] and [`commands`], wiring in [`bootstrap`],
//! and the per-command logic in [`handlers`]. `main.rs` only dispatches.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary target only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliContext, bootstrap};
pub use commands::Commands;
pub use parser::Cli;
