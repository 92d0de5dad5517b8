//! The flavor format (unidentified item appearances).
//!
//! ```text
//! N: index : tval : sval
//! G: symbol : color
//! D: description
//! ```

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::export::envelope;
use crate::parser::RecordSink;
use crate::schema::{
    Arity, ColorPolicy, FieldCheck, FieldKind, IdOrdering, Identity, LimitKind, LimitSpec,
    LineKind, Schema, Validity,
};
use crate::validation::rules::is_numeric;

use super::{load_records, numeric_field, push_description};

pub static SCHEMA: Schema = Schema {
    name: "flavor",
    label: "Flavor",
    plural: "flavors",
    count_label: "flavor",
    file_name: "flavor.txt",
    starter: 'N',
    starter_rule: LineKind::Fields {
        arity: Arity::AtLeast(3),
        fields: &[
            FieldCheck {
                name: "index",
                kind: FieldKind::Numeric,
            },
            FieldCheck {
                name: "tval",
                kind: FieldKind::Numeric,
            },
            FieldCheck {
                name: "sval",
                kind: FieldKind::Numeric,
            },
        ],
        strip_inline_comment: false,
    },
    tags: &[
        (
            'G',
            LineKind::Fields {
                arity: Arity::Exact(3),
                fields: &[
                    FieldCheck {
                        name: "symbol",
                        kind: FieldKind::Symbol,
                    },
                    FieldCheck {
                        name: "color",
                        kind: FieldKind::Color,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        ('D', LineKind::FreeText),
    ],
    identity: Identity::NumericId {
        ordering: IdOrdering::AdvisoryDecrease,
    },
    validity: Validity::ErrorsAndWarnings,
    limit: Some(LimitSpec {
        code: 'L',
        banner: "flavors",
        kind: LimitKind::MaxCount,
    }),
    colors: Some(ColorPolicy {
        extended: &["b1", "g1", "v1", "r1", "G1", "U1", "D1", "W1", "u1", "B1", "y1"],
        unknown_is_error: true,
    }),
    colon_symbol_escape: false,
    seq_checks: &[],
};

/// A flavor record.
#[derive(Debug, Clone, Serialize)]
pub struct Flavor {
    pub id: i64,
    pub tval: i64,
    pub sval: Option<i64>,
    pub symbol: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = Flavor;

    fn start(&self, parts: &[String], _line: &str) -> Option<Flavor> {
        if parts.len() < 3 || !is_numeric(&parts[1]) || !is_numeric(&parts[2]) {
            return None;
        }
        Some(Flavor {
            id: parts[1].parse().ok()?,
            tval: parts[2].parse().ok()?,
            sval: parts.get(3).and_then(|s| numeric_field(s)),
            symbol: None,
            color: None,
            description: None,
        })
    }

    fn attr(&self, record: &mut Flavor, tag: char, parts: &[String], line: &str, _raw: &str) {
        match tag {
            'G' if parts.len() >= 3 => {
                record.symbol = Some(parts[1].clone());
                record.color = Some(parts[2].clone());
            }
            'D' => {
                push_description(&mut record.description, line.get(2..).unwrap_or("").trim());
            }
            _ => {}
        }
    }
}

pub fn load(path: &Path) -> Vec<Flavor> {
    load_records(&SCHEMA, path, &Sink)
}

pub fn export(records: Vec<Flavor>) -> Value {
    envelope(SCHEMA.plural, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::assemble;
    use crate::validation::validate_source;
    use serde_json::json;

    #[test]
    fn test_parse_with_and_without_sval() {
        let records = assemble(&SCHEMA, "N:1:75\nG:!:b1\nN:2:75:12\n", &Sink);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sval, None);
        assert_eq!(records[0].symbol.as_deref(), Some("!"));
        assert_eq!(records[1].sval, Some(12));
    }

    #[test]
    fn test_extended_color_accepted() {
        let result = validate_source(&SCHEMA, "V:1\nN:1:75\nG:!:y1\n", None);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
    }

    #[test]
    fn test_multi_char_symbol_rejected() {
        let result = validate_source(&SCHEMA, "V:1\nN:1:75\nG:!!:y\n", None);
        assert_eq!(result.error_count(), 1);
        assert!(result.errors[0].contains("single character"));
    }

    #[test]
    fn test_export_shape() {
        let records = assemble(&SCHEMA, "N:3:80:4\nG:,:g\nD:A mottled mushroom.\n", &Sink);
        let value = export(records);
        assert_eq!(
            value,
            json!({"flavors": [{
                "id": 3,
                "tval": 80,
                "sval": 4,
                "symbol": ",",
                "color": "g",
                "description": "A mottled mushroom.",
            }]})
        );
    }
}
