//! deep merge of [Value] objects
use crate::value::{Map, Value};

/// Merges `incoming` into `base` and returns the result
///
/// For each key of `incoming`:
/// - both sides hold objects: merge recursively
/// - otherwise: the incoming value replaces the base value (including type changes)
///
/// Keys only present in `base` are kept as they are.
pub fn merge(mut base: Map, incoming: Map) -> Map {
    merge_into(&mut base, incoming);
    base
}

/// In-place variant of [merge]
pub fn merge_into(base: &mut Map, incoming: Map) {
    for (key, value) in incoming {
        if let Some(existing) = base.get_mut(&key) {
            merge_value(existing, value);
        } else {
            base.insert(key, value);
        }
    }
}

fn merge_value(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(base), Value::Object(nested)) => merge_into(base, nested),
        (existing, incoming) => *existing = incoming,
    }
}

/// Wraps `leaf` in one object per key, innermost key last
///
/// `nest(["b", "c"], v)` is `{ b = { c = v } }`
pub fn nest<K: AsRef<str>>(keys: &[K], leaf: Value) -> Value {
    keys.iter().rev().fold(leaf, |value, key| {
        Value::Object(Map::from_iter([(key.as_ref().to_owned(), value)]))
    })
}

/// Removes the value at the nested key path
///
/// Returns whether anything was removed. Sibling keys and their order are untouched.
pub fn remove_nested<K: AsRef<str>>(map: &mut Map, keys: &[K]) -> bool {
    match keys {
        [] => false,
        [last] => map.shift_remove(last.as_ref()).is_some(),
        [first, rest @ ..] => match map.get_mut(first.as_ref()) {
            Some(Value::Object(inner)) => remove_nested(inner, rest),
            _ => false,
        },
    }
}
