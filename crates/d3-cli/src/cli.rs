//! CLI argument definitions and parsing.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// ManySecured D3 CLI for creating, linting and exporting D3 claims.
#[derive(Debug, Parser)]
#[command(name = "d3-cli")]
#[command(version, about, long_about = None)]
#[command(after_help = "Example: d3-cli ./manufacturers")]
pub struct Cli {
    /// Folders containing D3 YAML files
    pub inputs: Vec<PathBuf>,

    /// Mode to run d3-cli in
    #[arg(short, long, value_enum, default_value = "build")]
    pub mode: Mode,

    /// Directory in which to output built claims
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Check that URIs/refs resolve. This can be very slow
    #[arg(long, alias = "check_uri_resolves")]
    pub check_uri_resolves: bool,

    /// Keep going after a claim fails and report every failure
    #[arg(long, alias = "pass_on_failure")]
    pub pass_on_failure: bool,

    /// More logging (repeatable)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less logging (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Generate and show a GUID and exit
    #[arg(long, visible_alias = "uuid")]
    pub guid: bool,

    /// Number of worker threads
    #[arg(short, long, env = "D3_JOBS")]
    pub jobs: Option<usize>,

    /// Configuration file path
    #[arg(short, long, env = "D3_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// What to do with the input folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Resolve, validate and write JSON artifacts (default)
    Build,
    /// Resolve and validate without writing anything
    Lint,
    /// Render built artifacts as markdown
    Export,
}
