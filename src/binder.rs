//! Binding of a merged tree onto the target's serialized shape.
//!
//! The target is bound in tree form: its current value (usually the zero value)
//! is serialized, the merged file tree is copied into it field by field, and
//! the loader deserializes the result back into the target type.

use crate::error::{ConfigError, ConfigResult};
use crate::infer::Guess;
use crate::merge::deep_merge;
use crate::schema::{FieldSpec, Schema, Shape};
use crate::tree::{ConfigTree, SlotPath, kind_name};
use serde_json::{Map, Number, Value};
use tracing::debug;

/// Copy `tree` into `target` following `schema`.
///
/// Keys are matched against field names ignoring ASCII case. Fields missing
/// from the tree keep their current value. Target fields the schema does not
/// list are bound too: a mapping merges into the current value and anything
/// else is coerced like a declared leaf. Keys matching no target field are
/// ignored.
///
/// Returns the leaves written into untyped (`null`) slots, for
/// [`crate::infer::settle`] to type once the whole target is known.
pub fn bind(tree: ConfigTree, schema: &Schema, target: &mut Value) -> ConfigResult<Vec<Guess>> {
    let mut guesses = Vec::new();
    bind_struct(tree, schema, target, &SlotPath::root(), &mut guesses)?;
    Ok(guesses)
}

fn bind_struct(
    tree: Value,
    schema: &Schema,
    target: &mut Value,
    at: &SlotPath,
    guesses: &mut Vec<Guess>,
) -> ConfigResult<()> {
    let mut source = match tree {
        Value::Object(map) => map,
        Value::Null => return Ok(()),
        other => {
            return Err(ConfigError::binding(
                at.display(),
                format!("expected a mapping, found {}", kind_name(&other)),
            ));
        }
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(slots) = target else {
        return Ok(());
    };

    for field in schema.fields() {
        let Some(value) = take_key(&mut source, field.name()) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let field_at = at.key(field.name());
        let slot = slots.entry(field.name()).or_insert(Value::Null);

        match field.shape() {
            Shape::Scalar => bind_leaf(slot, value, &field_at, guesses)?,
            Shape::Struct(element) => {
                if slot.is_null() {
                    *slot = element
                        .template()
                        .map_err(|e| ConfigError::binding(field_at.display(), e.to_string()))?;
                }
                bind_struct(value, &element.schema, slot, &field_at, guesses)?;
            }
            Shape::Sequence(element) => {
                let items = match value {
                    Value::Array(items) => items,
                    other => {
                        return Err(ConfigError::binding(
                            field_at.display(),
                            format!("expected a sequence, found {}", kind_name(&other)),
                        ));
                    }
                };
                // The source length wins; extra target elements are dropped.
                let mut existing = match std::mem::take(slot) {
                    Value::Array(existing) => existing.into_iter(),
                    _ => Vec::new().into_iter(),
                };
                let mut bound = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    let item_at = field_at.index(i);
                    let mut elem = match existing.next() {
                        Some(current) if current.is_object() => current,
                        _ => element
                            .template()
                            .map_err(|e| ConfigError::binding(item_at.display(), e.to_string()))?,
                    };
                    bind_struct(item, &element.schema, &mut elem, &item_at, guesses)?;
                    bound.push(elem);
                }
                *slot = Value::Array(bound);
            }
        }
    }

    let undeclared: Vec<String> = slots
        .keys()
        .filter(|key| !schema.fields().iter().map(FieldSpec::name).any(|name| key.as_str() == name))
        .cloned()
        .collect();
    for key in undeclared {
        let Some(value) = take_key(&mut source, &key) else {
            continue;
        };
        let Some(slot) = slots.get_mut(&key) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let field_at = at.key(&key);
        if slot.is_object() && value.is_object() {
            let current = std::mem::take(slot);
            *slot = deep_merge(current, value);
        } else {
            bind_leaf(slot, value, &field_at, guesses)?;
        }
        debug!(field = %field_at, "bound field without schema entry");
    }
    Ok(())
}

fn bind_leaf(
    slot: &mut Value,
    value: Value,
    at: &SlotPath,
    guesses: &mut Vec<Guess>,
) -> ConfigResult<()> {
    let untyped = slot.is_null();
    let bound = coerce_leaf(slot, value, at.display())?;
    if untyped {
        guesses.extend(Guess::of(at, &bound));
    }
    *slot = bound;
    Ok(())
}

/// Remove `name` from the mapping, exact spelling first, then ignoring case.
fn take_key(source: &mut Map<String, Value>, name: &str) -> Option<Value> {
    if let Some(value) = source.remove(name) {
        return Some(value);
    }
    let key = source.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned()?;
    source.remove(&key)
}

/// Coerce a tree leaf into the type implied by the slot's current value.
///
/// A `null` leaf leaves the slot unchanged. When the current value is `null`
/// (an unset `Option`) or a container, the leaf is taken as-is; the typed
/// deserialization at the end of the load decides whether it fits.
pub(crate) fn coerce_leaf(current: &Value, value: Value, path: &str) -> ConfigResult<Value> {
    match (current, value) {
        (current, Value::Null) => Ok(current.clone()),
        (
            Value::Bool(_) | Value::Number(_) | Value::String(_),
            value @ (Value::Object(_) | Value::Array(_)),
        ) => Err(ConfigError::binding(
            path,
            format!("expected {}, found {}", kind_name(current), kind_name(&value)),
        )),
        (Value::Number(template), Value::String(text)) => parse_number(&text, template, path),
        (Value::Bool(_), Value::String(text)) => parse_bool(&text, path),
        (Value::String(_), Value::Number(n)) => Ok(Value::String(n.to_string())),
        (Value::String(_), Value::Bool(b)) => Ok(Value::String(b.to_string())),
        (_, value) => Ok(value),
    }
}

/// Parse text as a number of the same flavour as `template`.
pub(crate) fn parse_number(text: &str, template: &Number, path: &str) -> ConfigResult<Value> {
    let text = text.trim();
    let parsed = if template.is_f64() {
        text.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        text.parse::<u64>()
            .map(Number::from)
            .or_else(|_| text.parse::<i64>().map(Number::from))
            .ok()
    };
    parsed
        .map(Value::Number)
        .ok_or_else(|| ConfigError::binding(path, format!("'{text}' is not a valid number")))
}

/// Parse text as a boolean.
pub(crate) fn parse_bool(text: &str, path: &str) -> ConfigResult<Value> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Ok(Value::Bool(true)),
        "0" | "f" | "false" | "no" | "off" => Ok(Value::Bool(false)),
        _ => Err(ConfigError::binding(
            path,
            format!("'{}' is not a valid boolean", text.trim()),
        )),
    }
}
