//! Deep merge of configuration trees.
//!
//! Implements field-by-field merging where the override layer wins over the base
//! layer. Sequences are replaced entirely, not concatenated or merged element-wise.

use crate::tree::ConfigTree;
use serde_json::Value;

/// Deep merge two trees, with `overlay` taking precedence over `base`.
///
/// Mapping keys are matched ignoring ASCII case, and a match keeps the base
/// spelling. A `null` overlay is "not specified" and leaves the base alone, so
/// a blank file merged over a populated one changes nothing. Every other
/// non-mapping value replaces the base wholesale, sequences included.
///
/// # Example
/// ```
/// use serde_json::json;
/// use configor::merge::deep_merge;
///
/// let base = json!({
///     "db": { "port": 5432, "host": "localhost" },
///     "hosts": ["a", "b"]
/// });
/// let overlay = json!({
///     "DB": { "port": 6432, "host": null },
///     "hosts": ["c"]
/// });
/// let result = deep_merge(base, overlay);
/// assert_eq!(result, json!({
///     "db": { "port": 6432, "host": "localhost" },
///     "hosts": ["c"]
/// }));
/// ```
pub fn deep_merge(base: ConfigTree, overlay: ConfigTree) -> ConfigTree {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let base_key = if base_map.contains_key(&key) {
                    Some(key.clone())
                } else {
                    base_map
                        .keys()
                        .find(|k| k.eq_ignore_ascii_case(&key))
                        .cloned()
                };
                match base_key.and_then(|k| base_map.remove(&k).map(|v| (k, v))) {
                    Some((base_key, base_value)) => {
                        base_map.insert(base_key, deep_merge(base_value, overlay_value));
                    }
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge the layers of several files, the last file winning.
pub fn deep_merge_all(layers: impl IntoIterator<Item = ConfigTree>) -> ConfigTree {
    layers.into_iter().fold(Value::Null, deep_merge)
}
