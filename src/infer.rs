//! Typing of leaves written into untyped slots.
//!
//! An unset `Option` serializes to `null`, which says nothing about the inner
//! type. A leaf written there keeps a first reading (what the file said, or
//! what the text looks like) and remembers one alternative. The typed
//! deserialization at the end of a load decides between the two, field by
//! field.

use crate::error::{ConfigError, ConfigResult};
use crate::tree::{ConfigTree, SlotPath};
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};
use std::collections::HashSet;
use tracing::debug;

/// A leaf whose type was inferred, with the reading to fall back to.
#[derive(Debug, Clone, PartialEq)]
pub struct Guess {
    pub at: SlotPath,
    pub alternative: Value,
}

impl Guess {
    /// Record `value`, just written at `at`.
    ///
    /// Strings that look like booleans or numbers can be read as such, and
    /// booleans and numbers can be read as their text. Plain text has no
    /// second reading but is still recorded, so a rejection names the field.
    pub fn of(at: &SlotPath, value: &Value) -> Option<Self> {
        let alternative = match value {
            Value::String(text) => infer_scalar(text),
            Value::Bool(b) => Value::String(b.to_string()),
            Value::Number(n) => Value::String(n.to_string()),
            _ => return None,
        };
        Some(Self {
            at: at.clone(),
            alternative,
        })
    }

    /// Record a value parsed from `raw`; the fallback is `raw` verbatim.
    pub fn of_text(at: &SlotPath, raw: &str) -> Self {
        Self {
            at: at.clone(),
            alternative: Value::String(raw.to_string()),
        }
    }
}

/// Best-effort typing of text with no type to follow: boolean, then integer,
/// then float, otherwise the text itself.
pub fn infer_scalar(raw: &str) -> Value {
    let trimmed = raw.trim();
    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

/// Deserialize `tree` into `T`, switching guessed leaves to their alternative
/// reading where `T` rejects the first one.
///
/// On success `tree` holds the readings that were kept. A leaf neither reading
/// fits is reported as a binding error at its own path.
pub fn settle<T: DeserializeOwned>(tree: &mut ConfigTree, guesses: &[Guess]) -> ConfigResult<T> {
    let first_error = match T::deserialize(&*tree) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    // Later guesses for the same slot supersede earlier ones.
    let mut seen = HashSet::new();
    let mut pending: Vec<(&Guess, Value)> = Vec::new();
    for guess in guesses.iter().rev() {
        if !seen.insert(guess.at.pointer()) {
            continue;
        }
        if let Some(slot) = tree.pointer_mut(guess.at.pointer()) {
            pending.push((guess, std::mem::take(slot)));
        }
    }
    if pending.is_empty() {
        return Err(ConfigError::binding("", first_error.to_string()));
    }
    // With every guessed leaf unset the rest of the tree must already fit.
    if let Err(e) = T::deserialize(&*tree) {
        restore(tree, pending);
        return Err(ConfigError::binding("", e.to_string()));
    }

    while let Some((guess, first)) = pending.pop() {
        put(tree, guess, first);
        let rejected = match T::deserialize(&*tree) {
            Ok(_) => continue,
            Err(e) => e,
        };
        put(tree, guess, guess.alternative.clone());
        if T::deserialize(&*tree).is_err() {
            return Err(ConfigError::binding(guess.at.display(), rejected.to_string()));
        }
        debug!(field = %guess.at, "took alternative reading of untyped field");
    }

    T::deserialize(&*tree).map_err(|e| ConfigError::binding("", e.to_string()))
}

fn put(tree: &mut ConfigTree, guess: &Guess, value: Value) {
    if let Some(slot) = tree.pointer_mut(guess.at.pointer()) {
        *slot = value;
    }
}

fn restore(tree: &mut ConfigTree, pending: Vec<(&Guess, Value)>) {
    for (guess, value) in pending {
        put(tree, guess, value);
    }
}
