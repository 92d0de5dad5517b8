//! The player history format.
//!
//! ```text
//! N: primary index : secondary index : probability : house
//! D: description
//! ```
//!
//! History entries carry no ids of their own; only the total entry count
//! is bounded by `M:H`.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::export::envelope;
use crate::parser::RecordSink;
use crate::schema::{
    Arity, FieldCheck, FieldKind, Identity, LimitKind, LimitSpec, LineKind, Schema, Validity,
};

use super::{load_records, push_description};

pub static SCHEMA: Schema = Schema {
    name: "history",
    label: "History",
    plural: "history",
    count_label: "history entry",
    file_name: "history.txt",
    starter: 'N',
    starter_rule: LineKind::Fields {
        arity: Arity::Exact(5),
        fields: &[
            FieldCheck {
                name: "primary index",
                kind: FieldKind::Numeric,
            },
            FieldCheck {
                name: "secondary index",
                kind: FieldKind::Numeric,
            },
            FieldCheck {
                name: "probability",
                kind: FieldKind::NumericRangeWarn { lo: 1, hi: 100 },
            },
            FieldCheck {
                name: "house",
                kind: FieldKind::Numeric,
            },
        ],
        strip_inline_comment: false,
    },
    tags: &[('D', LineKind::FreeText)],
    identity: Identity::EntryCount,
    validity: Validity::ErrorsAndWarnings,
    limit: Some(LimitSpec {
        code: 'H',
        banner: "history lines",
        kind: LimitKind::CountOnly,
    }),
    colors: None,
    colon_symbol_escape: false,
    seq_checks: &[],
};

/// A history record.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub primary_index: i64,
    pub secondary_index: i64,
    pub probability: i64,
    pub house: i64,
    pub description: Option<String>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = HistoryEntry;

    fn start(&self, parts: &[String], _line: &str) -> Option<HistoryEntry> {
        if parts.len() != 5 {
            return None;
        }
        Some(HistoryEntry {
            primary_index: parts[1].parse().ok()?,
            secondary_index: parts[2].parse().ok()?,
            probability: parts[3].parse().ok()?,
            house: parts[4].parse().ok()?,
            description: None,
        })
    }

    fn attr(&self, record: &mut HistoryEntry, tag: char, _parts: &[String], line: &str, _raw: &str) {
        if tag == 'D' {
            // Spacing after D: is significant and kept as-is
            push_description(&mut record.description, line.get(2..).unwrap_or(""));
        }
    }
}

pub fn load(path: &Path) -> Vec<HistoryEntry> {
    load_records(&SCHEMA, path, &Sink)
}

pub fn export(records: Vec<HistoryEntry>) -> Value {
    envelope(SCHEMA.plural, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::assemble;
    use crate::limits::ResolvedLimits;
    use crate::validation::validate_source;

    #[test]
    fn test_parse_entries() {
        let source = "V:1\nN:1:2:40:0\nD:You are the only child\nD:of a Beorning warrior.\n";
        let records = assemble(&SCHEMA, source, &Sink);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].probability, 40);
        assert_eq!(
            records[0].description.as_deref(),
            Some("You are the only child of a Beorning warrior.")
        );
    }

    #[test]
    fn test_probability_range_warning() {
        let result = validate_source(&SCHEMA, "V:1\nN:1:2:150:0\n", None);
        assert!(result.errors.is_empty());
        assert_eq!(
            result.warnings,
            vec!["Line 2: N: probability 150 is outside expected range 1-100"]
        );
    }

    #[test]
    fn test_entry_count_limit() {
        let limits = ResolvedLimits {
            max_count: 1,
            max_id: None,
            citation: "M:H:1".to_string(),
            max_ability_id: None,
        };
        let source = "V:1\nN:1:1:50:0\nN:1:2:50:0\n";
        let result = validate_source(&SCHEMA, source, Some(&limits));
        assert_eq!(
            result.errors,
            vec!["Total history entry count (2) exceeds maximum allowed (1) from limits.txt M:H"]
        );
    }

    #[test]
    fn test_malformed_entry_not_counted() {
        let limits = ResolvedLimits {
            max_count: 1,
            max_id: None,
            citation: "M:H:1".to_string(),
            max_ability_id: None,
        };
        let source = "V:1\nN:1:1:50:0\nN:bad:2:50:0\n";
        let result = validate_source(&SCHEMA, source, Some(&limits));
        // The second entry fails validation, so only one is counted
        assert!(result
            .errors
            .iter()
            .all(|e| !e.contains("Total history entry count")));
    }
}
