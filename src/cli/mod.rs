//! CLI layer for `archintel`.
//!
//! Provides the command-line interface using clap: `ingest`, `search`,
//! `analog-search`, and `job-status`, wired to a production-shaped
//! [`crate::app::Core`] for local smoke-testing (`spec.md` §6 ambient
//! addition).

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::{CommandOutcome, execute};
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
