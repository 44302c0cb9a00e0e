//! Lint command implementation.

use crate::error::Result;
use crate::output::Formatter;
use d3_build::{BuildConfig, BuildReport};

/// Execute the lint command: every build check, nothing written.
pub fn execute_lint(config: BuildConfig, formatter: &Formatter) -> Result<BuildReport> {
    let config = BuildConfig { emit: false, ..config };
    tracing::info!("Linting claims from {} folder(s)", config.inputs.len());
    let report = d3_build::build(config)?;

    println!("{}", formatter.format_report(&report));
    println!("{}", formatter.info("Lint only, no artifacts written"));

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lint_leaves_output_empty() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(
            input.path().join("echo.behaviour.d3.yaml"),
            "type: d3-device-type-behaviour\ncredentialSubject:\n  id: 0b5d1a6e-5f39-4c43-a1b2-3c4d5e6f7a8b\n  rules: []\n",
        )
        .unwrap();

        let config = BuildConfig {
            inputs: vec![input.path().to_path_buf()],
            output_dir: output.path().to_path_buf(),
            jobs: 1,
            ..BuildConfig::default()
        };
        let report = execute_lint(config, &Formatter::new(false)).unwrap();
        assert_eq!(report.processed, 1);
        assert!(report.written.is_empty());
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
    }
}
