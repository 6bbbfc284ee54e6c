//! Configuration loader with layer-based resolution.
//!
//! Pipeline for one [`Configor::load`] call:
//! 1. For every file (left to right): parse it, parse its environment override
//!    if one exists, and deep-merge the override over it
//! 2. Deep-merge all files, later files winning
//! 3. Bind the merged tree onto the target's current value
//! 4. Fill zero fields from explicit env vars, generic env vars, then defaults
//! 5. Fail with one aggregated error if any required field is still zero
//! 6. Deserialize into the target type, settling the type of any value written
//!    into an unset `Option`

use crate::binder::bind;
use crate::env::{EnvSource, ProcessEnv};
use crate::error::{BoxError, ConfigError, ConfigResult};
use crate::format::{FormatRegistry, ParseFn};
use crate::infer::settle;
use crate::locator::{EnvironmentLocator, detect_run_mode};
use crate::merge::{deep_merge, deep_merge_all};
use crate::overlay::Overlay;
use crate::schema::Configurable;
use crate::tree::ConfigTree;
use crate::validate::validate;
use std::path::Path;
use tracing::{debug, info};

/// Variable overriding the generic environment variable prefix.
pub const ENV_PREFIX_VAR: &str = "CONFIGOR_ENV_PREFIX";

/// Prefix used for generic environment variable names.
pub const DEFAULT_ENV_PREFIX: &str = "CONFIGOR";

/// Prefix value that disables prefixing altogether.
pub const NO_PREFIX: &str = "-";

/// Caller-supplied settings; each one wins over its environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Active environment, instead of `CONFIGOR_ENV`.
    pub environment: Option<String>,
    /// Generic variable prefix, instead of `CONFIGOR_ENV_PREFIX`. `-` disables it.
    pub env_prefix: Option<String>,
}

/// Resolves configuration files, environment and defaults into a target.
#[derive(Debug, Clone)]
pub struct Configor<E: EnvSource = ProcessEnv> {
    env: E,
    options: LoaderOptions,
    formats: FormatRegistry,
    run_mode: Option<String>,
}

impl Default for Configor<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl Configor<ProcessEnv> {
    /// A loader reading the process environment.
    pub fn new() -> Self {
        Self::with_env(ProcessEnv)
    }
}

impl<E: EnvSource> Configor<E> {
    /// A loader reading variables from `env`.
    pub fn with_env(env: E) -> Self {
        Self {
            env,
            options: LoaderOptions::default(),
            formats: FormatRegistry::default(),
            run_mode: detect_run_mode(),
        }
    }

    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the detected build/run mode (`None` disables it).
    pub fn with_run_mode(mut self, run_mode: Option<String>) -> Self {
        self.run_mode = run_mode;
        self
    }

    /// Register an additional file format.
    pub fn with_format(mut self, extension: &str, parser: ParseFn) -> Self {
        self.formats.register(extension, parser);
        self
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn locator(&self) -> EnvironmentLocator {
        EnvironmentLocator::new(self.options.environment.clone(), self.run_mode.clone())
    }

    /// The active environment name.
    pub fn environment(&self) -> String {
        self.locator().environment(&self.env)
    }

    /// The effective generic variable prefix; `None` when disabled.
    pub fn env_prefix(&self) -> Option<String> {
        let prefix = self
            .options
            .env_prefix
            .clone()
            .filter(|p| !p.is_empty())
            .or_else(|| self.env.lookup(ENV_PREFIX_VAR))
            .unwrap_or_else(|| DEFAULT_ENV_PREFIX.to_string());
        (prefix != NO_PREFIX).then_some(prefix)
    }

    /// Resolve the file layer only: every file merged with its override, then
    /// all files merged left to right.
    pub fn load_tree<P: AsRef<Path>>(&self, files: &[P]) -> ConfigResult<ConfigTree> {
        let locator = self.locator();
        let environment = locator.environment(&self.env);
        debug!(%environment, files = files.len(), "resolving file layer");

        let mut layers = Vec::with_capacity(files.len());
        for file in files {
            let path = file.as_ref();
            let base = self
                .read_tree(path)
                .map_err(|source| ConfigError::Source {
                    path: path.to_path_buf(),
                    source,
                })?;
            let tree = match locator.locate(path, &environment) {
                Some(override_path) => {
                    let overlay = self.read_tree(&override_path).map_err(|source| {
                        ConfigError::OverrideSource {
                            path: override_path.clone(),
                            environment: environment.clone(),
                            source,
                        }
                    })?;
                    debug!(path = %override_path.display(), "merged environment override");
                    deep_merge(base, overlay)
                }
                None => base,
            };
            layers.push(tree);
        }
        Ok(deep_merge_all(layers))
    }

    /// Load `files` into `target`.
    ///
    /// `target` is only replaced when every stage succeeds; on error it keeps
    /// its previous value.
    pub fn load<T, P>(&self, target: &mut T, files: &[P]) -> ConfigResult<()>
    where
        T: Configurable,
        P: AsRef<Path>,
    {
        let schema = T::schema();
        let descriptors = schema.descriptors();

        let merged = self.load_tree(files)?;

        let mut resolved = serde_json::to_value(&*target)
            .map_err(|e| ConfigError::binding("", e.to_string()))?;
        let mut guesses = bind(merged, &schema, &mut resolved)?;
        settle::<T>(&mut resolved, &guesses)?;

        guesses.extend(
            Overlay::new(&self.env, self.env_prefix()).apply(&descriptors, &mut resolved)?,
        );
        validate(&descriptors, &resolved)?;

        *target = settle(&mut resolved, &guesses)?;
        info!(files = files.len(), "configuration loaded");
        Ok(())
    }

    fn read_tree(&self, path: &Path) -> Result<ConfigTree, BoxError> {
        let content = std::fs::read_to_string(path)?;
        let tree = self.formats.parse(path, &content)?;
        debug!(path = %path.display(), "parsed configuration file");
        Ok(tree)
    }
}

/// Load `files` into `target` using the process environment.
pub fn load<T, P>(target: &mut T, files: &[P]) -> ConfigResult<()>
where
    T: Configurable,
    P: AsRef<Path>,
{
    Configor::new().load(target, files)
}
