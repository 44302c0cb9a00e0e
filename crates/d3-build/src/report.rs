//! Outcome of a build run

use d3_domain::{ClaimId, Warning};
use std::path::PathBuf;
use std::time::Duration;

/// A claim that failed while failures were being passed over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimFailure {
    /// Source file
    pub path: PathBuf,
    /// Claim id
    pub claim: ClaimId,
    /// Rendered error
    pub message: String,
}

/// What a build did
///
/// Tracks artifacts written and skipped, claims that failed and every
/// warning raised along the way.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Claims found under the input folders
    pub discovered: usize,

    /// Claims that passed every check
    pub processed: usize,

    /// Artifacts written
    pub written: Vec<PathBuf>,

    /// Artifacts left alone because they were already up to date
    pub skipped: Vec<PathBuf>,

    /// Sources that vanished after discovery
    pub missing: Vec<PathBuf>,

    /// Claims that failed
    pub failures: Vec<ClaimFailure>,

    /// Non-fatal findings
    pub warnings: Vec<Warning>,

    /// Wall-clock time of the build
    pub elapsed: Duration,
}

impl BuildReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a written artifact
    pub fn record_written(&mut self, path: PathBuf) {
        self.written.push(path);
    }

    /// Record an artifact that was already up to date
    pub fn record_skipped(&mut self, path: PathBuf) {
        self.skipped.push(path);
    }

    /// Record a source that disappeared
    pub fn record_missing(&mut self, path: PathBuf) {
        self.missing.push(path);
    }

    /// Record a failed claim
    pub fn record_failure(&mut self, path: PathBuf, claim: ClaimId, message: impl Into<String>) {
        self.failures.push(ClaimFailure {
            path,
            claim,
            message: message.into(),
        });
    }

    /// Record warnings
    pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        self.warnings.extend(warnings);
    }

    /// Whether every discovered claim went through
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Build Summary".to_string(),
            "=============".to_string(),
            format!("Claims discovered: {}", self.discovered),
            format!("Claims processed: {}", self.processed),
            format!("Artifacts written: {}", self.written.len()),
            format!("Artifacts up to date: {}", self.skipped.len()),
        ];

        if !self.missing.is_empty() {
            lines.push(format!("Sources missing: {}", self.missing.len()));
        }
        if !self.failures.is_empty() {
            lines.push(format!("Claims failed: {}", self.failures.len()));
        }
        if !self.warnings.is_empty() {
            lines.push(format!("Warnings: {}", self.warnings.len()));
        }
        lines.push(format!("Elapsed: {:.2}s", self.elapsed.as_secs_f64()));

        lines.join("\n")
    }
}
