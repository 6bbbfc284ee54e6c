//! configor CLI
//!
//! Inspects layered configuration: merges files with their environment
//! overrides and reports which environment and override files are in effect.

use anyhow::Result;
use clap::Parser;
use configor::cli::{Cli, Command, locate, merge};
use configor::env::ProcessEnv;
use configor::logging::{self, LogTarget};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;
    debug!(command = ?cli.command, "starting configor");

    match &cli.command {
        Command::Merge(args) => {
            let output = merge::run(args, ProcessEnv)?;
            println!("{}", output.trim_end());
        }
        Command::Locate(args) => {
            print!("{}", locate::run(args, ProcessEnv));
        }
    }
    Ok(())
}
