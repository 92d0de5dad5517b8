//! The player house format.
//!
//! ```text
//! N: house number : house name
//! A: alternate name
//! B: short name
//! F: house flag
//! S: str : dex : con : gra
//! D: description
//! ```

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::export::envelope;
use crate::parser::RecordSink;
use crate::schema::{
    Arity, FieldCheck, FieldKind, IdOrdering, Identity, LimitKind, LimitSpec, LineKind, Schema,
    Validity,
};
use crate::validation::rules::is_numeric;

use super::{load_records, push_description};

/// Skill affinity flags a house may carry.
const HOUSE_FLAGS: &[&str] = &[
    "SMT_AFFINITY",
    "WIL_AFFINITY",
    "PER_AFFINITY",
    "SNG_AFFINITY",
    "EVN_AFFINITY",
    "STL_AFFINITY",
    "MEL_AFFINITY",
    "ARC_AFFINITY",
];

pub static SCHEMA: Schema = Schema {
    name: "house",
    label: "House",
    plural: "houses",
    count_label: "house",
    file_name: "house.txt",
    starter: 'N',
    starter_rule: LineKind::Fields {
        arity: Arity::AtLeast(3),
        fields: &[FieldCheck {
            name: "house number",
            kind: FieldKind::Numeric,
        }],
        strip_inline_comment: false,
    },
    tags: &[
        ('A', LineKind::FreeText),
        ('B', LineKind::FreeText),
        ('F', LineKind::SingleFlag { known: HOUSE_FLAGS }),
        (
            'S',
            LineKind::Fields {
                arity: Arity::Exact(5),
                fields: &[
                    FieldCheck {
                        name: "str",
                        kind: FieldKind::SignedNumeric,
                    },
                    FieldCheck {
                        name: "dex",
                        kind: FieldKind::SignedNumeric,
                    },
                    FieldCheck {
                        name: "con",
                        kind: FieldKind::SignedNumeric,
                    },
                    FieldCheck {
                        name: "gra",
                        kind: FieldKind::SignedNumeric,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        ('D', LineKind::FreeText),
    ],
    identity: Identity::NumericId {
        ordering: IdOrdering::AdvisoryNonIncrease,
    },
    validity: Validity::ErrorsAndWarnings,
    limit: Some(LimitSpec {
        code: 'C',
        banner: "houses",
        kind: LimitKind::MaxCount,
    }),
    colors: None,
    colon_symbol_escape: false,
    seq_checks: &[],
};

/// A house record.
#[derive(Debug, Clone, Serialize)]
pub struct House {
    pub id: i64,
    pub name: String,
    pub alternate_name: Option<String>,
    pub short_name: Option<String>,
    pub flag: Option<String>,
    pub stats: Vec<i64>,
    pub description: Option<String>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = House;

    fn start(&self, parts: &[String], _line: &str) -> Option<House> {
        if parts.len() < 3 || !is_numeric(&parts[1]) {
            return None;
        }
        Some(House {
            id: parts[1].parse().ok()?,
            name: parts[2..].join(":"),
            alternate_name: None,
            short_name: None,
            flag: None,
            stats: Vec::new(),
            description: None,
        })
    }

    fn attr(&self, record: &mut House, tag: char, parts: &[String], line: &str, _raw: &str) {
        match tag {
            'A' => record.alternate_name = Some(line.get(2..).unwrap_or("").trim().to_string()),
            'B' => record.short_name = Some(line.get(2..).unwrap_or("").trim().to_string()),
            'F' => record.flag = Some(line.get(2..).unwrap_or("").trim().to_string()),
            'S' if parts.len() == 5 => {
                let stats: Option<Vec<i64>> =
                    parts[1..5].iter().map(|s| s.parse().ok()).collect();
                if let Some(stats) = stats {
                    record.stats = stats;
                }
            }
            'D' => {
                // House descriptions keep spacing after D:
                push_description(&mut record.description, line.get(2..).unwrap_or(""));
            }
            _ => {}
        }
    }
}

pub fn load(path: &Path) -> Vec<House> {
    load_records(&SCHEMA, path, &Sink)
}

pub fn export(records: Vec<House>) -> Value {
    envelope(SCHEMA.plural, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::assemble;
    use crate::validation::validate_source;

    const FEANOR: &str = "V:1\n\
        N:0:House of Feanor\n\
        A:Feanorian\n\
        B:Feanor\n\
        F:SMT_AFFINITY\n\
        S:1:1:-1:0\n\
        D:The most skilled craftsmen among the Noldor.\n";

    #[test]
    fn test_parse_full_record() {
        let records = assemble(&SCHEMA, FEANOR, &Sink);
        assert_eq!(records.len(), 1);
        let h = &records[0];
        assert_eq!(h.name, "House of Feanor");
        assert_eq!(h.alternate_name.as_deref(), Some("Feanorian"));
        assert_eq!(h.short_name.as_deref(), Some("Feanor"));
        assert_eq!(h.flag.as_deref(), Some("SMT_AFFINITY"));
        assert_eq!(h.stats, vec![1, 1, -1, 0]);
    }

    #[test]
    fn test_validates_clean() {
        let result = validate_source(&SCHEMA, FEANOR, None);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_unrecognized_flag_warns() {
        let result = validate_source(&SCHEMA, "V:1\nN:0:Test\nF:BAD_FLAG\n", None);
        assert!(result.errors.is_empty());
        assert_eq!(
            result.warnings,
            vec!["Line 3: F: unrecognized flag 'BAD_FLAG'"]
        );
    }

    #[test]
    fn test_partial_stats_dropped() {
        let records = assemble(&SCHEMA, "N:0:Test\nS:1:x:0:0\n", &Sink);
        assert!(records[0].stats.is_empty());
    }

    #[test]
    fn test_equal_ids_warn_not_error() {
        let result = validate_source(&SCHEMA, "V:1\nN:1:A\nN:1:B\n", None);
        // The duplicate is an error; the non-increase is only a warning
        assert_eq!(
            result.warnings,
            vec!["Line 3: ID 1 is not greater than previous ID 1"]
        );
    }
}
