//! Configuration management for the CLI.

use crate::cli::{Cli, Mode};
use crate::error::Result;
use d3_build::BuildConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
///
/// Read from `~/.d3/config.toml` unless `--config` names another file.
///
/// ```toml
/// [build]
/// jobs = 4
/// pass_on_failure = true
///
/// [settings]
/// color = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Defaults for build and lint runs
    #[serde(default)]
    pub build: BuildDefaults,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Build settings a config file may provide. Flags override them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildDefaults {
    /// Worker count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,

    /// Check URI reachability
    #[serde(default)]
    pub check_uri_resolves: bool,

    /// Keep going after failing claims
    #[serde(default)]
    pub pass_on_failure: bool,

    /// Per-URI timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_timeout_secs: Option<u64>,

    /// Replacement schema folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<PathBuf>,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".d3").join("config.toml"))
    }

    /// Load the default configuration file, or defaults when there is none.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a given file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Build configuration for a run: file values, then flags on top.
    pub fn build_config(&self, cli: &Cli) -> Result<BuildConfig> {
        let base = match cli.mode {
            Mode::Lint => BuildConfig::lint(),
            Mode::Build | Mode::Export => BuildConfig::default(),
        };

        let config = BuildConfig {
            inputs: cli.inputs.clone(),
            output_dir: cli.output.clone(),
            jobs: cli.jobs.or(self.build.jobs).unwrap_or(base.jobs),
            check_uri_resolves: cli.check_uri_resolves || self.build.check_uri_resolves,
            pass_on_failure: cli.pass_on_failure || self.build.pass_on_failure,
            uri_timeout_secs: self.build.uri_timeout_secs.unwrap_or(base.uri_timeout_secs),
            schema_dir: self.build.schema_dir.clone(),
            emit: base.emit,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self { color: true }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert!(config.build.jobs.is_none());
        assert!(!config.build.pass_on_failure);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[build]\njobs = 3\npass_on_failure = true\nuri_timeout_secs = 5\n\n[settings]\ncolor = false\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.build.jobs, Some(3));
        assert!(config.build.pass_on_failure);
        assert_eq!(config.build.uri_timeout_secs, Some(5));
        assert!(!config.settings.color);
    }

    #[test]
    fn test_empty_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.settings.color);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[build\njobs = ").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CliError::Toml(_))));
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config {
            build: BuildDefaults {
                jobs: Some(8),
                uri_timeout_secs: Some(2),
                ..BuildDefaults::default()
            },
            settings: Settings::default(),
        };
        let cli = Cli::parse_from(["d3-cli", "claims", "--jobs", "2", "--pass-on-failure", "-o", "out"]);

        let build = config.build_config(&cli).unwrap();
        assert_eq!(build.jobs, 2);
        assert_eq!(build.uri_timeout_secs, 2);
        assert!(build.pass_on_failure);
        assert!(build.emit);
        assert_eq!(build.inputs, vec![PathBuf::from("claims")]);
        assert_eq!(build.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_lint_mode_writes_nothing() {
        let cli = Cli::parse_from(["d3-cli", "claims", "--mode", "lint", "--jobs", "1"]);
        let build = Config::default().build_config(&cli).unwrap();
        assert!(!build.emit);
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let cli = Cli::parse_from(["d3-cli", "claims", "--jobs", "0"]);
        assert!(matches!(Config::default().build_config(&cli), Err(CliError::Build(_))));
    }
}
