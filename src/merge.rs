//! Structural merge of session payloads

use serde_json::Value;

/// Merge `incoming` onto `base`.
///
/// When both sides hold an object at the same position the objects are merged
/// key by key, recursively. In every other case (scalars, arrays, nulls, or an
/// object meeting a non-object) the incoming value replaces the base value.
/// Keys present only in `base` are kept.
pub fn deep_merge(base: Value, incoming: Value) -> Value {
    match (base, incoming) {
        (Value::Object(mut base), Value::Object(incoming)) => {
            for (key, value) in incoming {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, incoming) => incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_incoming_scalar_wins() {
        let merged = deep_merge(json!({"a": 1, "b": "x"}), json!({"a": 2}));
        assert_eq!(merged, json!({"a": 2, "b": "x"}));
    }

    #[test]
    fn test_nested_objects_merge() {
        let base = json!({"cart": {"apples": 1, "pears": 2}, "user": "bob"});
        let incoming = json!({"cart": {"pears": 5, "plums": 1}});
        assert_eq!(
            deep_merge(base, incoming),
            json!({"cart": {"apples": 1, "pears": 5, "plums": 1}, "user": "bob"})
        );
    }

    #[test]
    fn test_arrays_are_replaced() {
        let merged = deep_merge(json!({"tags": [1, 2, 3]}), json!({"tags": [4]}));
        assert_eq!(merged, json!({"tags": [4]}));
    }

    #[test]
    fn test_type_mismatch_takes_incoming() {
        assert_eq!(deep_merge(json!({"a": {"b": 1}}), json!({"a": 7})), json!({"a": 7}));
        assert_eq!(deep_merge(json!({"a": 7}), json!({"a": {"b": 1}})), json!({"a": {"b": 1}}));
        assert_eq!(deep_merge(json!([1]), json!({"a": 1})), json!({"a": 1}));
    }
}
