//! Locate subcommand for configor CLI
//!
//! Reports which environment is active and which override file would be
//! merged over a given base file.

use crate::env::EnvSource;
use crate::loader::{Configor, LoaderOptions};
use crate::locator::override_path;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the locate subcommand
#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Base configuration file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Environment name (overrides CONFIGOR_ENV)
    #[arg(short, long, value_name = "NAME")]
    pub env: Option<String>,
}

/// Human-readable report for `args`.
pub fn run<E: EnvSource>(args: &LocateArgs, env: E) -> String {
    let loader = Configor::with_env(env).with_options(LoaderOptions {
        environment: args.env.clone(),
        ..Default::default()
    });
    let environment = loader.environment();
    let (candidate, status) = match loader.locator().locate(&args.file, &environment) {
        Some(found) => (found, "found"),
        None => (override_path(&args.file, &environment), "not found"),
    };
    let prefix = loader
        .env_prefix()
        .unwrap_or_else(|| "(none)".to_string());

    let mut out = String::new();
    out.push_str(&format!("environment: {}\n", environment));
    out.push_str(&format!("base: {}\n", args.file.display()));
    out.push_str(&format!("override: {} ({})\n", candidate.display(), status));
    out.push_str(&format!("env prefix: {}\n", prefix));
    out
}
