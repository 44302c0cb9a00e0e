//! Output formatting for the CLI.

use colored::*;
use d3_build::BuildReport;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format a build report: summary, then failures and warnings as tables.
    pub fn format_report(&self, report: &BuildReport) -> String {
        let mut sections = vec![report.summary()];

        if !report.failures.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["File", "Claim", "Error"]);
            for failure in &report.failures {
                builder.push_record([
                    failure.path.display().to_string(),
                    failure.claim.to_string(),
                    failure.message.clone(),
                ]);
            }
            sections.push(self.error(&format!("{} claim(s) failed", report.failures.len())));
            sections.push(table(builder));
        }

        if !report.warnings.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Claim", "Warning"]);
            for warning in &report.warnings {
                builder.push_record([warning.claim.to_string(), warning.to_string()]);
            }
            sections.push(self.warning(&format!("{} warning(s)", report.warnings.len())));
            sections.push(table(builder));
        }

        if report.is_success() {
            sections.push(self.success("Build complete"));
        }

        sections.join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn table(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use d3_domain::{ClaimId, Warning};
    use std::path::PathBuf;

    #[test]
    fn test_clean_report() {
        let formatter = Formatter::new(false);
        let mut report = BuildReport::new();
        report.discovered = 2;
        report.processed = 2;
        let output = formatter.format_report(&report);
        assert!(output.contains("Build Summary"));
        assert!(output.contains("✓ Build complete"));
        assert!(!output.contains("Warning"));
    }

    #[test]
    fn test_failures_table() {
        let formatter = Formatter::new(false);
        let mut report = BuildReport::new();
        report.record_failure(PathBuf::from("bad.type.d3.yaml"), ClaimId::from("bad"), "schema violation");
        let output = formatter.format_report(&report);
        assert!(output.contains("✗ 1 claim(s) failed"));
        assert!(output.contains("bad.type.d3.yaml"));
        assert!(output.contains("schema violation"));
        assert!(!output.contains("Build complete"));
    }

    #[test]
    fn test_warnings_table() {
        let formatter = Formatter::new(false);
        let mut report = BuildReport::new();
        report.record_warnings([Warning::unresolved_reference(ClaimId::from("t1"), "https://down.example.com")]);
        let output = formatter.format_report(&report);
        assert!(output.contains("⚠ 1 warning(s)"));
        assert!(output.contains("https://down.example.com"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.info("test"), "ℹ test");
    }
}
