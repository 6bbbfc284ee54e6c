//! Format-agnostic configuration tree.
//!
//! Parsers for every file format produce a [`ConfigTree`]; the binder, the
//! overlay and the validator all work on the same representation. This module
//! also owns the single definition of "unset" shared by overlay and validation.

use crate::error::ConfigResult;
use serde_json::{Map, Value};

/// Parsed configuration data: scalars, sequences and string-keyed mappings.
pub type ConfigTree = Value;

/// Shared `null` for absent slots.
pub(crate) static NULL: Value = Value::Null;

/// Whether a value is the zero value of its type.
///
/// - `null`, `false`, `0`, `""` and `[]` are zero
/// - a mapping is zero when every member is zero (an empty mapping included)
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.values().all(is_zero),
    }
}

/// Human-readable kind of a node, used in binding diagnostics.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Append a field name to a dotted display path.
fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

/// Location of one slot in a tree.
///
/// Carries both the dotted form used in diagnostics (`contacts[1].email`) and
/// the JSON pointer used to reach the slot again (`/contacts/1/email`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SlotPath {
    display: String,
    pointer: String,
}

impl SlotPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of member `name` of the mapping at `self`.
    pub fn key(&self, name: &str) -> Self {
        Self {
            display: join_path(&self.display, name),
            pointer: format!(
                "{}/{}",
                self.pointer,
                name.replace('~', "~0").replace('/', "~1")
            ),
        }
    }

    /// Path of element `index` of the sequence at `self`.
    pub fn index(&self, index: usize) -> Self {
        Self {
            display: format!("{}[{index}]", self.display),
            pointer: format!("{}/{index}", self.pointer),
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }
}

impl std::fmt::Display for SlotPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

/// Visit every slot addressed by `path`, mutably.
///
/// Sequences met before the last segment are fanned out: the remaining path is
/// applied to each element independently. The callback receives the location
/// of the slot (with element indices), the owning mapping and the key.
/// Missing intermediate nodes end the walk silently.
pub fn visit_slots_mut<F>(
    node: &mut Value,
    path: &[&str],
    at: &SlotPath,
    f: &mut F,
) -> ConfigResult<()>
where
    F: FnMut(&SlotPath, &mut Map<String, Value>, &str) -> ConfigResult<()>,
{
    match node {
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                visit_slots_mut(item, path, &at.index(i), f)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            let Some((head, rest)) = path.split_first() else {
                return Ok(());
            };
            let at = at.key(head);
            if rest.is_empty() {
                f(&at, map, *head)
            } else if let Some(child) = map.get_mut(*head) {
                visit_slots_mut(child, rest, &at, f)
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

/// Collect every slot addressed by `path` with its current value.
///
/// Same traversal as [`visit_slots_mut`]; a slot whose key is absent from its
/// mapping is reported as `null`.
pub fn slots<'a>(node: &'a Value, path: &[&str]) -> Vec<(SlotPath, &'a Value)> {
    let mut out = Vec::new();
    collect_slots(node, path, &SlotPath::root(), &mut out);
    out
}

fn collect_slots<'a>(
    node: &'a Value,
    path: &[&str],
    at: &SlotPath,
    out: &mut Vec<(SlotPath, &'a Value)>,
) {
    match node {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_slots(item, path, &at.index(i), out);
            }
        }
        Value::Object(map) => {
            let Some((head, rest)) = path.split_first() else {
                return;
            };
            let at = at.key(head);
            if rest.is_empty() {
                out.push((at, map.get(*head).unwrap_or(&NULL)));
            } else if let Some(child) = map.get(*head) {
                collect_slots(child, rest, &at, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_values() {
        assert!(is_zero(&json!(null)));
        assert!(is_zero(&json!(false)));
        assert!(is_zero(&json!(0)));
        assert!(is_zero(&json!(0.0)));
        assert!(is_zero(&json!("")));
        assert!(is_zero(&json!([])));
        assert!(is_zero(&json!({})));
        assert!(is_zero(&json!({"a": "", "b": {"c": 0}})));
    }

    #[test]
    fn test_non_zero_values() {
        assert!(!is_zero(&json!(true)));
        assert!(!is_zero(&json!(-1)));
        assert!(!is_zero(&json!(0.5)));
        assert!(!is_zero(&json!("x")));
        assert!(!is_zero(&json!([0])));
        assert!(!is_zero(&json!({"a": "", "b": 1})));
    }

    #[test]
    fn test_slots_fan_out_over_sequences() {
        let tree = json!({
            "contacts": [
                {"email": "a@example.com"},
                {"name": "b"}
            ]
        });
        let found: Vec<(String, &Value)> = slots(&tree, &["contacts", "email"])
            .into_iter()
            .map(|(at, value)| (at.to_string(), value))
            .collect();
        assert_eq!(
            found,
            vec![
                ("contacts[0].email".to_string(), &json!("a@example.com")),
                ("contacts[1].email".to_string(), &Value::Null),
            ]
        );
    }

    #[test]
    fn test_slots_skip_missing_parents() {
        let tree = json!({"db": null});
        assert!(slots(&tree, &["db", "name"]).is_empty());
        assert!(slots(&tree, &["other", "name"]).is_empty());
    }

    #[test]
    fn test_visit_slots_mut_assigns() {
        let mut tree = json!({"db": {"port": 0}, "hosts": [{}, {}]});
        visit_slots_mut(&mut tree, &["db", "port"], &SlotPath::root(), &mut |_, map, key| {
            map.insert(key.to_string(), json!(5432));
            Ok(())
        })
        .unwrap();
        let mut seen = Vec::new();
        visit_slots_mut(&mut tree, &["hosts", "name"], &SlotPath::root(), &mut |at, map, key| {
            seen.push(at.pointer().to_string());
            map.insert(key.to_string(), json!("h"));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            tree,
            json!({"db": {"port": 5432}, "hosts": [{"name": "h"}, {"name": "h"}]})
        );
        assert_eq!(seen, vec!["/hosts/0/name", "/hosts/1/name"]);
    }

    #[test]
    fn test_slot_path_forms() {
        let at = SlotPath::root().key("contacts").index(1).key("email");
        assert_eq!(at.display(), "contacts[1].email");
        assert_eq!(at.pointer(), "/contacts/1/email");
        assert_eq!(SlotPath::root().key("a/b~c").pointer(), "/a~1b~0c");

        let mut tree = json!({"contacts": [{}, {"email": "x@example.com"}]});
        assert_eq!(tree.pointer_mut(at.pointer()), Some(&mut json!("x@example.com")));
    }
}
