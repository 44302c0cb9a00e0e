//! Configuration for a build run

use crate::BuildError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default worker count: one less than the available cores, at least one
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Configuration for a build
///
/// # Examples
///
/// ```
/// use d3_build::BuildConfig;
///
/// // Build every claim and write artifacts
/// let config = BuildConfig::default();
/// assert!(config.emit);
/// assert!(!config.pass_on_failure);
///
/// // Check everything, write nothing
/// let config = BuildConfig::lint();
/// assert!(!config.emit);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Folders searched for claim sources
    pub inputs: Vec<PathBuf>,

    /// Folder receiving the JSON artifacts
    /// Default: current directory
    pub output_dir: PathBuf,

    /// Size of the worker pool
    /// Default: available parallelism - 1, minimum 1
    pub jobs: usize,

    /// Check that URIs in claims are reachable (slow, network bound)
    /// Default: false
    pub check_uri_resolves: bool,

    /// Keep going after a claim fails, reporting every failure at the end
    /// Default: false
    pub pass_on_failure: bool,

    /// Time allowed for each URI check (in seconds)
    /// Default: 10
    pub uri_timeout_secs: u64,

    /// Folder with replacement schemas (`claim.schema.json`, `<kind>.schema.json`)
    pub schema_dir: Option<PathBuf>,

    /// Write artifacts; false only checks the claims
    /// Default: true
    pub emit: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output_dir: PathBuf::from("."),
            jobs: default_jobs(),
            check_uri_resolves: false,
            pass_on_failure: false,
            uri_timeout_secs: d3_schema::DEFAULT_TIMEOUT_SECS,
            schema_dir: None,
            emit: true,
        }
    }
}

impl BuildConfig {
    /// Configuration that runs every check but writes nothing
    pub fn lint() -> Self {
        Self {
            emit: false,
            ..Self::default()
        }
    }

    /// Reject settings the build cannot run with
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.jobs == 0 {
            return Err(BuildError::Config("jobs must be at least 1".to_string()));
        }
        if self.uri_timeout_secs == 0 {
            return Err(BuildError::Config("uri_timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Get the URI check timeout as Duration
    pub fn uri_timeout(&self) -> Duration {
        Duration::from_secs(self.uri_timeout_secs)
    }
}
