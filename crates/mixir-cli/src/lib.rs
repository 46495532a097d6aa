//! The `mixir` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;
pub mod session;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use session::Session;
