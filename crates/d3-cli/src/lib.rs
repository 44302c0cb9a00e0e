//! D3 CLI library.
//!
//! This library provides the core functionality for the `d3-cli` command-line
//! interface: argument parsing, configuration, logging setup, report
//! formatting and the markdown export of built claims.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod output;

pub use cli::{Cli, Mode};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
