//! JSON export normalization.
//!
//! Every exporter serializes its records and strips nulls, empty strings,
//! and empty collections so the output only carries fields that are
//! actually set. Pruning recurses into nested maps and into maps inside
//! lists; scalar list items are kept as-is. The top-level envelope is
//! `{"<plural-format-name>": [records...]}`.

use serde::Serialize;
use serde_json::{Map, Value};

/// Remove null, empty-string, and empty-collection values from a record
/// tree. Maps nested in lists are cleaned too and dropped when they come
/// out empty.
pub fn clean_record(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(clean_map(map)),
        other => other,
    }
}

fn clean_map(map: Map<String, Value>) -> Map<String, Value> {
    let mut result = Map::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::String(s) if s.is_empty() => {}
            Value::Object(inner) => {
                let cleaned = clean_map(inner);
                if !cleaned.is_empty() {
                    result.insert(key, Value::Object(cleaned));
                }
            }
            Value::Array(items) => {
                let cleaned = clean_list(items);
                if !cleaned.is_empty() {
                    result.insert(key, Value::Array(cleaned));
                }
            }
            other => {
                result.insert(key, other);
            }
        }
    }
    result
}

fn clean_list(items: Vec<Value>) -> Vec<Value> {
    let mut result = Vec::new();
    for item in items {
        match item {
            Value::Null => {}
            Value::Object(inner) => {
                let cleaned = clean_map(inner);
                if !cleaned.is_empty() {
                    result.push(Value::Object(cleaned));
                }
            }
            other => result.push(other),
        }
    }
    result
}

/// Serialize records into the standard export envelope, cleaning each
/// record tree.
pub fn envelope<T: Serialize>(plural: &str, records: &[T]) -> Value {
    let list: Vec<Value> = records
        .iter()
        .filter_map(|r| serde_json::to_value(r).ok())
        .map(clean_record)
        .collect();
    let mut map = Map::new();
    map.insert(plural.to_string(), Value::Array(list));
    Value::Object(map)
}

/// Pretty-print an export document (2-space indent, matching the wire
/// format consumers already parse).
pub fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_drops_null_empty_string_empty_list() {
        let cleaned = clean_record(json!({
            "id": 0,
            "name": "Test",
            "missing": null,
            "empty": "",
            "list": [],
        }));
        assert_eq!(cleaned, json!({"id": 0, "name": "Test"}));
    }

    #[test]
    fn test_zero_is_kept() {
        let cleaned = clean_record(json!({"id": 0, "depth": 0}));
        assert_eq!(cleaned, json!({"id": 0, "depth": 0}));
    }

    #[test]
    fn test_nested_maps_cleaned_recursively() {
        let cleaned = clean_record(json!({
            "spell_info": {"frequency": null, "spells": []},
            "other": {"power": 3, "none": null},
        }));
        assert_eq!(cleaned, json!({"other": {"power": 3}}));
    }

    #[test]
    fn test_maps_inside_lists_cleaned() {
        let cleaned = clean_record(json!({
            "attacks": [
                {"method": "HIT", "effect": null},
                {"method": null},
            ],
        }));
        assert_eq!(cleaned, json!({"attacks": [{"method": "HIT"}]}));
    }

    #[test]
    fn test_envelope_shape() {
        #[derive(serde::Serialize)]
        struct Rec {
            id: u32,
            name: Option<String>,
        }
        let records = vec![Rec { id: 0, name: None }];
        let value = envelope("things", &records);
        assert_eq!(value, json!({"things": [{"id": 0}]}));
    }

    #[test]
    fn test_pretty_output_is_stable() {
        let value = json!({"a": [1, 2]});
        assert_eq!(to_pretty(&value), to_pretty(&value));
    }
}
