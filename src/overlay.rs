//! Default and environment overlay.
//!
//! Runs after binding. Every scalar field still at its zero value is filled from,
//! in order of preference: its explicit environment variable, its generic
//! environment variable, then its declared default. Non-zero fields are never
//! touched, whatever layer set them.

use crate::binder::{parse_bool, parse_number};
use crate::env::EnvSource;
use crate::error::{ConfigError, ConfigResult};
use crate::infer::{Guess, infer_scalar};
use crate::schema::{FieldDescriptor, FieldKind};
use crate::tree::{ConfigTree, NULL, SlotPath, is_zero, visit_slots_mut};
use serde_json::Value;
use tracing::debug;

/// Configuration layer priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    /// Base file merged with its environment override (lowest priority)
    File = 0,
    /// Declared field default
    Default = 1,
    /// `PREFIX_FIELD_PATH` environment variable
    GenericEnv = 2,
    /// Environment variable named by the field itself (highest priority)
    ExplicitEnv = 3,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::File => write!(f, "file"),
            Layer::Default => write!(f, "default"),
            Layer::GenericEnv => write!(f, "generic env"),
            Layer::ExplicitEnv => write!(f, "explicit env"),
        }
    }
}

/// Fills zero-valued fields from the environment and declared defaults.
pub struct Overlay<'a, E: EnvSource + ?Sized> {
    env: &'a E,
    prefix: Option<String>,
}

impl<'a, E: EnvSource + ?Sized> Overlay<'a, E> {
    /// `prefix` of `None` makes generic names the bare uppercased path.
    pub fn new(env: &'a E, prefix: Option<String>) -> Self {
        Self { env, prefix }
    }

    /// Pick the value for one zero field, if any layer supplies one.
    pub fn resolve(&self, descriptor: &FieldDescriptor) -> Option<(String, Layer)> {
        if let Some(value) = descriptor.env.and_then(|name| self.env.lookup(name)) {
            return Some((value, Layer::ExplicitEnv));
        }
        let generic = descriptor.generic_env_name(self.prefix.as_deref());
        if let Some(value) = self.env.lookup(&generic) {
            return Some((value, Layer::GenericEnv));
        }
        descriptor
            .default
            .map(|literal| (literal.to_string(), Layer::Default))
    }

    /// Apply every scalar descriptor to `tree`, in descriptor order.
    ///
    /// Returns the values whose type had to be inferred from the text.
    pub fn apply(
        &self,
        descriptors: &[FieldDescriptor],
        tree: &mut ConfigTree,
    ) -> ConfigResult<Vec<Guess>> {
        let mut guesses = Vec::new();
        for descriptor in descriptors.iter().filter(|d| d.kind == FieldKind::Scalar) {
            visit_slots_mut(tree, &descriptor.path, &SlotPath::root(), &mut |at, map, key| {
                let current = map.get(key).unwrap_or(&NULL);
                if !is_zero(current) {
                    return Ok(());
                }
                let Some((raw, layer)) = self.resolve(descriptor) else {
                    return Ok(());
                };
                let value = coerce_text(current, &raw, at.display())?;
                if current.is_null() {
                    guesses.push(Guess::of_text(at, &raw));
                }
                debug!(field = %at, %layer, "filled unset field");
                map.insert(key.to_string(), value);
                Ok(())
            })?;
        }
        Ok(guesses)
    }
}

/// Coerce textual input (environment value or default literal) into the type
/// implied by the slot's zero value.
///
/// - strings are taken verbatim
/// - numbers and booleans are parsed, failing with a binding error
/// - sequences accept YAML flow syntax (`[a, b]`) or a comma-separated list
/// - mappings accept YAML flow syntax (`{a: 1}`)
/// - `null` (an unset `Option`) infers a boolean, a number, or a string
pub fn coerce_text(current: &Value, raw: &str, path: &str) -> ConfigResult<Value> {
    match current {
        Value::String(_) => Ok(Value::String(raw.to_string())),
        Value::Number(template) => parse_number(raw, template, path),
        Value::Bool(_) => parse_bool(raw, path),
        Value::Null => Ok(infer_scalar(raw)),
        Value::Array(_) => {
            let trimmed = raw.trim();
            if trimmed.starts_with('[') {
                parse_flow(trimmed, path).and_then(|value| match value {
                    Value::Array(_) => Ok(value),
                    other => Err(ConfigError::binding(
                        path,
                        format!("expected a sequence, found {}", crate::tree::kind_name(&other)),
                    )),
                })
            } else {
                Ok(Value::Array(
                    trimmed
                        .split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(infer_scalar)
                        .collect(),
                ))
            }
        }
        Value::Object(_) => parse_flow(raw.trim(), path).and_then(|value| match value {
            Value::Object(_) => Ok(value),
            other => Err(ConfigError::binding(
                path,
                format!("expected a mapping, found {}", crate::tree::kind_name(&other)),
            )),
        }),
    }
}

fn parse_flow(text: &str, path: &str) -> ConfigResult<Value> {
    serde_yaml::from_str::<Value>(text).map_err(|e| ConfigError::binding(path, e.to_string()))
}
