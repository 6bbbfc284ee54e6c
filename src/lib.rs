//! Layered configuration loading.
//!
//! Resolves a typed configuration object from a base file, an
//! environment-specific override file, environment variables and declared
//! defaults, then enforces required fields.
//!
//! ```no_run
//! use configor::{Configurable, FieldSpec, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Config {
//!     app_name: String,
//!     port: u16,
//! }
//!
//! impl Configurable for Config {
//!     fn schema() -> Schema {
//!         Schema::new()
//!             .field(FieldSpec::scalar("app_name").required())
//!             .field(FieldSpec::scalar("port").default("8080"))
//!     }
//! }
//!
//! let mut config = Config::default();
//! configor::load(&mut config, &["config/app.yaml"])?;
//! # Ok::<(), configor::ConfigError>(())
//! ```

pub mod binder;
pub mod cli;
pub mod env;
pub mod error;
pub mod format;
pub mod infer;
pub mod loader;
pub mod locator;
pub mod logging;
pub mod merge;
pub mod overlay;
pub mod schema;
pub mod tree;
pub mod validate;

pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use error::{ConfigError, ConfigResult, ErrorCode};
pub use loader::{Configor, LoaderOptions, load};
pub use schema::{Configurable, FieldDescriptor, FieldKind, FieldSpec, Schema};
pub use tree::ConfigTree;
