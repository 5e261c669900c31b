//! Flattening of nested JSON mappings into single-level keys

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Separator used by [`flatten`]
pub const DEFAULT_SEPARATOR: &str = ".";

/// Flatten nested objects into `a.b.c` keys
pub fn flatten(map: &Map<String, Value>) -> BTreeMap<String, &Value> {
    flatten_with(map, DEFAULT_SEPARATOR)
}

/// Flatten nested objects, joining path segments with `separator`
///
/// Leaves are borrowed from `map`. An empty nested object has no leaves and
/// so contributes no key. An empty path prefix is dropped rather than
/// joined, so `{"": {"b": 1}}` flattens to `b`. When two paths join to the
/// same key, the one visited later wins.
pub fn flatten_with<'a>(
    map: &'a Map<String, Value>,
    separator: &str,
) -> BTreeMap<String, &'a Value> {
    let mut out = BTreeMap::new();
    collect(map, "", separator, &mut out);
    out
}

/// Like [`flatten_with`] but clones leaves into a serializable map
pub fn flatten_owned(map: &Map<String, Value>, separator: &str) -> Map<String, Value> {
    flatten_with(map, separator)
        .into_iter()
        .map(|(key, value)| (key, value.clone()))
        .collect()
}

fn collect<'a>(
    map: &'a Map<String, Value>,
    parent: &str,
    separator: &str,
    out: &mut BTreeMap<String, &'a Value>,
) {
    for (key, value) in map {
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}{separator}{key}")
        };
        match value {
            Value::Object(nested) => collect(nested, &path, separator, out),
            leaf => {
                out.insert(path, leaf);
            }
        }
    }
}
