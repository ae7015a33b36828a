//! Dotted-path access into `serde_json::Value` trees.
//!
//! Field names are treated as dotted paths (`"address.city"`), so the value
//! context handed to validators is a nested object even though fields are
//! registered flat.

use serde_json::{Map, Value};

/// Look up a dotted path in a value tree.
///
/// Returns `None` if any segment is missing or the tree shape does not
/// match (e.g. indexing into a string).
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                current = items.get(index)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Set a dotted path in a value tree, creating intermediate objects.
///
/// A non-object intermediate value is replaced by an empty object, matching
/// the last-write-wins behavior of registering both `"a"` and `"a.b"`.
pub fn set(root: &mut Value, path: &str, value: Value) {
    if !root.is_object() {
        *root = Value::Object(Map::new());
    }

    match path.split_once('.') {
        None => {
            if let Value::Object(map) = root {
                map.insert(path.to_string(), value);
            }
        }
        Some((head, rest)) => {
            if let Value::Object(map) = root {
                let slot = map.entry(head.to_string()).or_insert(Value::Null);
                set(slot, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested() {
        let tree = json!({ "address": { "city": "Oslo" } });
        assert_eq!(get(&tree, "address.city"), Some(&json!("Oslo")));
        assert_eq!(get(&tree, "address.zip"), None);
        assert_eq!(get(&tree, "missing.path"), None);
    }

    #[test]
    fn test_get_array_index() {
        let tree = json!({ "tags": ["a", "b"] });
        assert_eq!(get(&tree, "tags.1"), Some(&json!("b")));
        assert_eq!(get(&tree, "tags.5"), None);
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut tree = Value::Null;
        set(&mut tree, "address.city", json!("Oslo"));
        set(&mut tree, "address.zip", json!("0150"));
        set(&mut tree, "name", json!("Kari"));
        assert_eq!(
            tree,
            json!({ "address": { "city": "Oslo", "zip": "0150" }, "name": "Kari" })
        );
    }

    #[test]
    fn test_set_overwrites_scalar_intermediate() {
        let mut tree = json!({ "a": 1 });
        set(&mut tree, "a.b", json!(2));
        assert_eq!(tree, json!({ "a": { "b": 2 } }));
    }
}
