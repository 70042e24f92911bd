//! Deep merge of configuration tiers.
//!
//! Objects merge key by key with the higher tier winning. Arrays and scalars
//! are replaced whole. A `null` in the higher tier means "not specified" and
//! keeps the lower tier's value.

use serde_json::Value;

/// Merge `overlay` into `base` in place.
///
/// # Example
/// ```
/// use serde_json::json;
/// use task_tracker::config::merge_into;
///
/// let mut base = json!({ "store": { "path": "db/tasks.json", "pretty": true } });
/// merge_into(&mut base, json!({ "store": { "pretty": false } }));
/// assert_eq!(base, json!({ "store": { "path": "db/tasks.json", "pretty": false } }));
/// ```
pub fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None if value.is_null() => {}
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, overlay) => *slot = overlay,
    }
}

/// Fold tiers lowest to highest.
pub fn merge_tiers(tiers: impl IntoIterator<Item = Value>) -> Value {
    let mut merged = Value::Null;
    for tier in tiers {
        merge_into(&mut merged, tier);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_keys_merge() {
        let mut base = json!({
            "store": {"path": "db/tasks.json", "pretty": true},
            "display": {"format": "table"}
        });
        merge_into(&mut base, json!({"store": {"path": "/tmp/t.json"}}));

        assert_eq!(
            base,
            json!({
                "store": {"path": "/tmp/t.json", "pretty": true},
                "display": {"format": "table"}
            })
        );
    }

    #[test]
    fn test_arrays_replaced() {
        let mut base = json!({"items": [1, 2, 3]});
        merge_into(&mut base, json!({"items": [4]}));
        assert_eq!(base, json!({"items": [4]}));
    }

    #[test]
    fn test_null_keeps_base() {
        let mut base = json!({"store": {"pretty": false}});
        merge_into(&mut base, json!({"store": {"pretty": null}, "display": null}));
        assert_eq!(base, json!({"store": {"pretty": false}}));
    }

    #[test]
    fn test_scalar_replaces_object() {
        let mut base = json!({"store": {"path": "a"}});
        merge_into(&mut base, json!({"store": "b"}));
        assert_eq!(base, json!({"store": "b"}));
    }

    #[test]
    fn test_merge_tiers_in_order() {
        let merged = merge_tiers(vec![
            json!({"display": {"format": "table"}, "store": {"pretty": true}}),
            json!({"display": {"format": "markdown"}}),
            json!({"display": {"format": "json"}}),
        ]);
        assert_eq!(
            merged,
            json!({"display": {"format": "json"}, "store": {"pretty": true}})
        );
    }

    #[test]
    fn test_merge_tiers_empty() {
        assert_eq!(merge_tiers(Vec::new()), Value::Null);
    }
}
