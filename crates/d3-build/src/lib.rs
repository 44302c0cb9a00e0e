//! D3 Build
//!
//! Builds D3 claim sources into resolved, schema-valid JSON artifacts.
//!
//! # Overview
//!
//! A build runs through these stages:
//! - **Discover**: walk the input folders and load every `*.d3.yaml` claim
//! - **Register**: check that identifiers are unique and canonical
//! - **GraphBuild**: link behaviours and types to their parents, reject
//!   cycles, resolve every type once
//! - **Resolve+Validate**: per claim, on the worker pool
//! - **Emit**: write artifacts that changed
//!
//! # Usage
//!
//! ```no_run
//! use d3_build::{build, BuildConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfig {
//!     inputs: vec!["claims".into()],
//!     output_dir: "build".into(),
//!     pass_on_failure: true,
//!     ..BuildConfig::default()
//! };
//! let report = build(config)?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`BuildConfig`] is serde-serializable. The `d3-cli` config file carries
//! the same keys in its `[build]` table:
//!
//! ```toml
//! inputs = ["claims"]
//! output_dir = "build"
//! jobs = 4
//! check_uri_resolves = false
//! pass_on_failure = false
//! uri_timeout_secs = 10
//! emit = true
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod report;

pub use builder::{BuildStage, Builder};
pub use config::{default_jobs, BuildConfig};
pub use discovery::SourceClaim;
pub use error::{BuildError, ClaimError};
pub use report::{BuildReport, ClaimFailure};

/// Run a build with the standard loader, schemas and reachability checks
pub fn build(config: BuildConfig) -> Result<BuildReport, BuildError> {
    Builder::from_config(config)?.run()
}
