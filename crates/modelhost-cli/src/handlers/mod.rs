//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that call the manager or installer and format output
//!   for the terminal. Lifecycle rules live in `modelhost-runtime`.

pub mod backend;
pub mod serve;
