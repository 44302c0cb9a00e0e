//! Build command implementation.

use crate::error::Result;
use crate::output::Formatter;
use d3_build::{BuildConfig, BuildReport};

/// Execute the build command.
pub fn execute_build(config: BuildConfig, formatter: &Formatter) -> Result<BuildReport> {
    tracing::info!("Building claims from {} folder(s)", config.inputs.len());
    let report = d3_build::build(config)?;

    println!("{}", formatter.format_report(&report));

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::fs;
    use tempfile::TempDir;

    const TYPE_ID: &str = "0b5d1a6e-5f39-4c43-a1b2-3c4d5e6f7a8b";

    fn config(input: &TempDir, output: &TempDir) -> BuildConfig {
        BuildConfig {
            inputs: vec![input.path().to_path_buf()],
            output_dir: output.path().to_path_buf(),
            jobs: 1,
            ..BuildConfig::default()
        }
    }

    #[test]
    fn test_build_writes_artifacts() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::create_dir_all(input.path().join("acme")).unwrap();
        fs::write(
            input.path().join("acme/echo.type.d3.yaml"),
            format!("type: d3-device-type-assertion\ncredentialSubject:\n  id: {}\n  name: Echo\n", TYPE_ID),
        )
        .unwrap();

        let report = execute_build(config(&input, &output), &Formatter::new(false)).unwrap();
        assert_eq!(report.written, vec![output.path().join("acme/echo.type.d3.json")]);
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let config = BuildConfig {
            inputs: vec![input.path().join("absent")],
            ..config(&input, &output)
        };
        assert!(matches!(
            execute_build(config, &Formatter::new(false)),
            Err(CliError::Build(_))
        ));
    }
}
