//! The limits format: `limits.txt` itself.
//!
//! ```text
//! M:<code>:<value(s)>
//! ```
//!
//! Every code takes a single value except `M:A`, which packs the four
//! artefact counts. The format is self-referential: the same file the
//! other validators consult for ceilings is validated here against the
//! known-code table.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::limits::{known_code, ARTEFACT_FIELDS};
use crate::parser::RecordSink;
use crate::schema::{Identity, LineKind, Schema, Validity};

use super::load_records;

pub static SCHEMA: Schema = Schema {
    name: "limits",
    label: "Limits",
    plural: "limits",
    count_label: "limit",
    file_name: "limits.txt",
    starter: 'M',
    starter_rule: LineKind::LimitDecl,
    tags: &[],
    identity: Identity::LimitCodes,
    validity: Validity::ErrorsAndWarnings,
    limit: None,
    colors: None,
    colon_symbol_escape: false,
    seq_checks: &[],
};

/// A limit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Limit {
    pub code: String,
    pub name: String,
    pub values: Vec<i64>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = Limit;

    fn start(&self, parts: &[String], _line: &str) -> Option<Limit> {
        if parts.len() < 3 {
            return None;
        }
        let code = parts[1].clone();
        let name = code
            .chars()
            .next()
            .filter(|_| code.chars().count() == 1)
            .and_then(known_code)
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| format!("unknown_{}", code));
        // All values must parse or the whole declaration is skipped
        let values: Option<Vec<i64>> = parts[2..].iter().map(|v| v.parse().ok()).collect();
        Some(Limit {
            code,
            name,
            values: values?,
        })
    }

    fn attr(&self, _record: &mut Limit, _tag: char, _parts: &[String], _line: &str, _raw: &str) {}
}

pub fn load(path: &Path) -> Vec<Limit> {
    load_records(&SCHEMA, path, &Sink)
}

/// Export limits as a name → value map in file order. Single values
/// flatten to numbers; the artefact quad becomes a nested map with a
/// computed total.
pub fn export(records: Vec<Limit>) -> Value {
    let mut limits = Map::new();
    for limit in records {
        if limit.values.len() == 1 {
            limits.insert(limit.name, Value::from(limit.values[0]));
        } else if limit.name == "artefacts" && limit.values.len() == ARTEFACT_FIELDS.len() {
            let mut artefacts = Map::new();
            for (field, value) in ARTEFACT_FIELDS.iter().zip(&limit.values) {
                artefacts.insert(field.to_string(), Value::from(*value));
            }
            artefacts.insert(
                "total".to_string(),
                Value::from(limit.values.iter().sum::<i64>()),
            );
            limits.insert(limit.name, Value::Object(artefacts));
        } else {
            limits.insert(limit.name, Value::from(limit.values));
        }
    }

    let mut root = Map::new();
    root.insert("limits".to_string(), Value::Object(limits));
    Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::assemble;
    use crate::validation::validate_source;
    use serde_json::json;

    #[test]
    fn test_parse_declarations() {
        let source = "V:1\nM:F:86\nM:A:5:10:3:7\nM:X:9\n";
        let records = assemble(&SCHEMA, source, &Sink);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "feature_types");
        assert_eq!(records[1].values, vec![5, 10, 3, 7]);
        assert_eq!(records[2].name, "unknown_X");
    }

    #[test]
    fn test_unparsable_values_skipped() {
        let records = assemble(&SCHEMA, "M:F:abc\n", &Sink);
        assert!(records.is_empty());
    }

    #[test]
    fn test_export_nested_artefacts() {
        let records = assemble(&SCHEMA, "M:B:240\nM:A:5:10:3:7\n", &Sink);
        let value = export(records);
        assert_eq!(
            value,
            json!({"limits": {
                "abilities": 240,
                "artefacts": {
                    "special": 5,
                    "normal": 10,
                    "random": 3,
                    "selfmade": 7,
                    "total": 25,
                },
            }})
        );
    }

    #[test]
    fn test_export_keeps_file_order() {
        let records = assemble(&SCHEMA, "M:R:656\nM:B:240\n", &Sink);
        let value = export(records);
        let keys: Vec<&String> = value["limits"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["monster_races", "abilities"]);
    }

    #[test]
    fn test_validate_unknown_code_warns() {
        let result = validate_source(&SCHEMA, "V:1\nM:X:9\n", None);
        assert!(result
            .warnings
            .contains(&"Line 2: M: unknown limit code 'X': M:X:9".to_string()));
    }

    #[test]
    fn test_validate_non_numeric_value() {
        let result = validate_source(&SCHEMA, "V:1\nM:F:abc\n", None);
        assert!(result
            .errors
            .contains(&"Line 2: M:F: value 1 is not numeric: abc".to_string()));
    }
}
