//! D3 CLI - build, lint and export D3 claims.

use clap::Parser;
use d3_cli::commands;
use d3_cli::{logging, Cli, Config, Formatter, Mode};
use d3_domain::ClaimId;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> d3_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if cli.guid {
        println!("{}", ClaimId::new());
        return Ok(());
    }

    logging::init(cli.verbose, cli.quiet);

    if cli.inputs.is_empty() {
        println!("No directories provided, Exiting...");
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let formatter = Formatter::new(!cli.no_color && config.settings.color);

    match cli.mode {
        Mode::Build => {
            commands::execute_build(config.build_config(&cli)?, &formatter)?;
        }
        Mode::Lint => {
            commands::execute_lint(config.build_config(&cli)?, &formatter)?;
        }
        Mode::Export => {
            commands::execute_export(&cli.inputs, &cli.output, &formatter)?;
        }
    }

    Ok(())
}
