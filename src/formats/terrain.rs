//! The terrain feature format.
//!
//! ```text
//! N: serial number : terrain name
//! G: symbol : color
//! M: feature to mimic
//! ```
//!
//! This is the one format where a data symbol can be a literal colon:
//! `G:::s` means symbol `:` in colour `s`. The tokenizer handles the
//! escape before the generic split.

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

use super::{load_records, numeric_field};

pub static SCHEMA: Schema = Schema {
    name: "terrain",
    label: "Terrain",
    plural: "terrains",
    count_label: "terrain",
    file_name: "terrain.txt",
    starter: 'N',
    starter_rule: LineKind::Fields {
        arity: Arity::AtLeast(3),
        fields: &[FieldCheck {
            name: "ID",
            kind: FieldKind::Numeric,
        }],
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
                        kind: FieldKind::Any,
                    },
                    FieldCheck {
                        name: "color",
                        kind: FieldKind::Color,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        (
            'M',
            LineKind::Fields {
                arity: Arity::Exact(2),
                fields: &[FieldCheck {
                    name: "mimic ID",
                    kind: FieldKind::Numeric,
                }],
                strip_inline_comment: false,
            },
        ),
    ],
    identity: Identity::NumericId {
        ordering: IdOrdering::Strict,
    },
    validity: Validity::ErrorsAndWarnings,
    limit: Some(LimitSpec {
        code: 'F',
        banner: "terrain features",
        kind: LimitKind::MaxCount,
    }),
    colors: Some(ColorPolicy {
        extended: &["G1", "v1", "B1", "U1", "D1", "W1", "y1"],
        unknown_is_error: true,
    }),
    colon_symbol_escape: true,
    seq_checks: &[],
};

/// A terrain record.
#[derive(Debug, Clone, Serialize)]
pub struct Terrain {
    pub id: i64,
    pub name: String,
    pub symbol: Option<String>,
    pub color: Option<String>,
    pub mimic: Option<i64>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = Terrain;

    fn start(&self, parts: &[String], _line: &str) -> Option<Terrain> {
        if parts.len() < 3 || !is_numeric(&parts[1]) {
            return None;
        }
        Some(Terrain {
            id: parts[1].parse().ok()?,
            name: parts[2].clone(),
            symbol: None,
            color: None,
            mimic: None,
        })
    }

    fn attr(&self, record: &mut Terrain, tag: char, parts: &[String], _line: &str, _raw: &str) {
        match tag {
            // A valid G:: escape arrives pre-split as ["G", ":", color]
            'G' if parts.len() >= 3 => {
                record.symbol = Some(parts[1].clone());
                record.color = Some(parts[2].clone());
            }
            'M' if parts.len() >= 2 => {
                if let Some(v) = numeric_field(&parts[1]) {
                    record.mimic = Some(v);
                }
            }
            _ => {}
        }
    }
}

pub fn load(path: &Path) -> Vec<Terrain> {
    load_records(&SCHEMA, path, &Sink)
}

pub fn export(records: Vec<Terrain>) -> Value {
    envelope(SCHEMA.plural, &records)
}
