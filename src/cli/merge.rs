//! Merge subcommand for configor CLI
//!
//! Resolves the file layer (each file plus its environment override, merged
//! left to right) and prints the resulting tree.

use crate::env::EnvSource;
use crate::format::OutputFormat;
use crate::loader::{Configor, LoaderOptions};
use anyhow::{Result, anyhow};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the merge subcommand
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Configuration files, later files override earlier ones
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Environment name (overrides CONFIGOR_ENV)
    #[arg(short, long, value_name = "NAME")]
    pub env: Option<String>,

    /// Output format: json (default) or yaml
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,
}

/// Render the merged file layer for `args`.
pub fn run<E: EnvSource>(args: &MergeArgs, env: E) -> Result<String> {
    let loader = Configor::with_env(env).with_options(LoaderOptions {
        environment: args.env.clone(),
        ..Default::default()
    });
    let tree = loader.load_tree(&args.files)?;
    args.format.render(&tree).map_err(|e| anyhow!(e))
}
