//! CLI command definitions for configor
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod locate;
pub mod merge;

use clap::{Parser, Subcommand};
use locate::LocateArgs;
use merge::MergeArgs;

/// Inspect layered configuration files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the merged file layer of one or more configuration files
    Merge(MergeArgs),

    /// Show the active environment and the override file of a configuration file
    Locate(LocateArgs),
}
