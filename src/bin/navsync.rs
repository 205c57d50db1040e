//! navsync CLI Binary
//!
//! Command-line interface for loading and snapshotting section navigation.

use anyhow::Context;
use clap::Parser;
use navsync::config::ConfigLoader;
use navsync::logging::init_logging;
use navsync::tooling::cli::{Cli, CliContext};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.logging = cli.logging_config(&config.logging);
    init_logging(Some(&config.logging)).context("Failed to initialize logging")?;

    let context = CliContext::new(config, cli.primary_source()).context("Failed to initialize CLI")?;
    let output = context.execute(&cli.command)?;
    println!("{}", output);
    Ok(())
}
