//! Active environment and environment-specific override files.
//!
//! `app.yaml` loaded in environment `production` is overridden by
//! `app.production.yaml` when that file exists.

use crate::env::EnvSource;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Variable selecting the active environment.
pub const ENV_NAME_VAR: &str = "CONFIGOR_ENV";

/// Environment used when nothing else selects one.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Environment reported when running under a test harness.
pub const TEST_ENVIRONMENT: &str = "test";

/// Resolves the environment name and the override file of a base file.
#[derive(Debug, Clone)]
pub struct EnvironmentLocator {
    /// Explicitly configured environment; wins over everything else.
    pub explicit: Option<String>,
    /// Build/run mode signal, e.g. `test` under `cargo test`.
    pub run_mode: Option<String>,
}

impl EnvironmentLocator {
    pub fn new(explicit: Option<String>, run_mode: Option<String>) -> Self {
        Self { explicit, run_mode }
    }

    /// Explicit option, then `CONFIGOR_ENV`, then run mode, then `development`.
    pub fn environment(&self, env: &(impl EnvSource + ?Sized)) -> String {
        self.explicit
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| env.lookup(ENV_NAME_VAR))
            .or_else(|| self.run_mode.clone().filter(|mode| !mode.is_empty()))
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }

    /// The override file for `base` if it exists on disk.
    ///
    /// A missing override is the normal case and is not an error.
    pub fn locate(&self, base: &Path, environment: &str) -> Option<PathBuf> {
        let candidate = override_path(base, environment);
        if candidate.is_file() {
            debug!(path = %candidate.display(), environment, "found environment override");
            Some(candidate)
        } else {
            debug!(path = %candidate.display(), environment, "no environment override");
            None
        }
    }
}

/// Insert `.<environment>` before the extension of `base`.
///
/// Files without an extension get the environment appended as one.
pub fn override_path(base: &Path, environment: &str) -> PathBuf {
    let Some(stem) = base.file_stem() else {
        return base.to_path_buf();
    };
    let mut name = OsString::from(stem);
    name.push(".");
    name.push(environment);
    if let Some(ext) = base.extension() {
        name.push(".");
        name.push(ext);
    }
    base.with_file_name(name)
}

/// Detect whether the current executable is a cargo test harness.
///
/// Test, bench and doctest binaries live in `target/<profile>/deps/`.
pub fn detect_run_mode() -> Option<String> {
    let exe = std::env::current_exe().ok()?;
    let in_deps = exe
        .parent()
        .and_then(Path::file_name)
        .is_some_and(|dir| dir == "deps");
    in_deps.then(|| TEST_ENVIRONMENT.to_string())
}
