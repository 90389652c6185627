//! dbafs CLI Binary
//!
//! Command-line interface for keeping a file tree and its record store in sync.

use anyhow::Context;
use clap::Parser;
use dbafs::logging::init_logging;
use dbafs::tooling::cli::{load_config, Cli, CliContext};
use std::process;

fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = load_config(&cli.workspace, cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(Some(&cli.logging_config(&config.logging)))
        .context("Failed to initialize logging")?;

    let context = CliContext::with_config(cli.workspace.clone(), config)
        .context("Error initializing workspace")?;
    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
