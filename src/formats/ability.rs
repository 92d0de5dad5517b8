//! The ability format.
//!
//! ```text
//! N: ability number : ability name
//! I: skill number : ability value : level requirement
//! P: prerequisite skill/ability pairs
//! T: tval : sval_min : sval_max
//! D: description
//! ```

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::export::envelope;
use crate::parser::RecordSink;
use crate::schema::{
    Arity, FieldCheck, FieldKind, IdOrdering, Identity, LimitKind, LimitSpec, LineKind, PairStyle,
    Schema, Validity,
};
use crate::validation::rules::{is_numeric, is_pair};

use super::{load_records, numeric_field, push_description};

pub static SCHEMA: Schema = Schema {
    name: "ability",
    label: "Ability",
    plural: "abilities",
    count_label: "ability",
    file_name: "ability.txt",
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
            'I',
            LineKind::Fields {
                arity: Arity::Exact(4),
                fields: &[
                    FieldCheck {
                        name: "skill number",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "ability value",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "level requirement",
                        kind: FieldKind::Numeric,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        (
            'P',
            LineKind::PairList {
                style: PairStyle::Prerequisite,
            },
        ),
        (
            'T',
            LineKind::Fields {
                arity: Arity::Exact(4),
                fields: &[
                    FieldCheck {
                        name: "tval",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "sval_min",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "sval_max",
                        kind: FieldKind::Numeric,
                    },
                ],
                strip_inline_comment: true,
            },
        ),
        ('D', LineKind::FreeText),
    ],
    identity: Identity::NumericId {
        ordering: IdOrdering::AdvisoryDecrease,
    },
    validity: Validity::ErrorsAndWarnings,
    limit: Some(LimitSpec {
        code: 'B',
        banner: "abilities",
        kind: LimitKind::MaxCount,
    }),
    colors: None,
    colon_symbol_escape: false,
    seq_checks: &[],
};

/// A prerequisite ability reference (P: line entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prerequisite {
    pub skill_id: i64,
    pub ability_id: i64,
}

/// An item type range (T: line entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemTypeRange {
    pub tval: i64,
    pub sval_min: i64,
    pub sval_max: i64,
}

/// An ability record.
#[derive(Debug, Clone, Serialize)]
pub struct Ability {
    pub id: i64,
    pub name: String,
    pub skill_id: Option<i64>,
    pub ability_value: Option<i64>,
    pub level_requirement: Option<i64>,
    pub prerequisites: Vec<Prerequisite>,
    pub item_types: Vec<ItemTypeRange>,
    pub description: Option<String>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = Ability;

    fn start(&self, parts: &[String], _line: &str) -> Option<Ability> {
        if parts.len() < 3 || !is_numeric(&parts[1]) {
            return None;
        }
        Some(Ability {
            id: parts[1].parse().ok()?,
            name: parts[2].clone(),
            skill_id: None,
            ability_value: None,
            level_requirement: None,
            prerequisites: Vec::new(),
            item_types: Vec::new(),
            description: None,
        })
    }

    fn attr(&self, record: &mut Ability, tag: char, parts: &[String], line: &str, _raw: &str) {
        match tag {
            'I' if parts.len() >= 4 => {
                if let Some(v) = numeric_field(&parts[1]) {
                    record.skill_id = Some(v);
                }
                if let Some(v) = numeric_field(&parts[2]) {
                    record.ability_value = Some(v);
                }
                if let Some(v) = numeric_field(&parts[3]) {
                    record.level_requirement = Some(v);
                }
            }
            'P' => {
                let content = line.get(2..).unwrap_or("");
                for piece in content.split(':') {
                    let piece = piece.trim();
                    if is_pair(piece) {
                        let (skill, ability) = piece.split_once('/').unwrap();
                        record.prerequisites.push(Prerequisite {
                            skill_id: skill.parse().unwrap_or(0),
                            ability_id: ability.parse().unwrap_or(0),
                        });
                    }
                }
            }
            'T' => {
                if let Some(range) = parse_item_type(line) {
                    record.item_types.push(range);
                }
            }
            'D' => {
                push_description(&mut record.description, line.get(2..).unwrap_or("").trim());
            }
            _ => {}
        }
    }
}

/// Parse a T: line, tolerating an inline `#` comment after the fields.
fn parse_item_type(line: &str) -> Option<ItemTypeRange> {
    let line = line.split('#').next().unwrap_or(line).trim();
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() != 4 {
        return None;
    }
    Some(ItemTypeRange {
        tval: parts[1].trim().parse().ok()?,
        sval_min: parts[2].trim().parse().ok()?,
        sval_max: parts[3].trim().parse().ok()?,
    })
}

pub fn load(path: &Path) -> Vec<Ability> {
    load_records(&SCHEMA, path, &Sink)
}

pub fn export(records: Vec<Ability>) -> Value {
    envelope(SCHEMA.plural, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::assemble;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(source: &str) -> Vec<Ability> {
        assemble(&SCHEMA, source, &Sink)
    }

    #[test]
    fn test_parse_basic_record() {
        let records = parse("V:1\nN:0:Test\nI:2:3:1\nD:First.\nD:Second.\n");
        assert_eq!(records.len(), 1);
        let a = &records[0];
        assert_eq!(a.id, 0);
        assert_eq!(a.name, "Test");
        assert_eq!(a.skill_id, Some(2));
        assert_eq!(a.ability_value, Some(3));
        assert_eq!(a.level_requirement, Some(1));
        assert_eq!(a.description.as_deref(), Some("First. Second."));
    }

    #[test]
    fn test_parse_prerequisites_and_item_types() {
        let records = parse("N:5:Armed\nP:0/1:2/3\nT:20:1:99 # comment\n");
        let a = &records[0];
        assert_eq!(
            a.prerequisites,
            vec![
                Prerequisite { skill_id: 0, ability_id: 1 },
                Prerequisite { skill_id: 2, ability_id: 3 },
            ]
        );
        assert_eq!(
            a.item_types,
            vec![ItemTypeRange { tval: 20, sval_min: 1, sval_max: 99 }]
        );
    }

    #[test]
    fn test_bad_prerequisite_piece_dropped() {
        let records = parse("N:0:Test\nP:1/2:bad:3/4\n");
        assert_eq!(records[0].prerequisites.len(), 2);
    }

    #[test]
    fn test_export_shape() {
        let records = parse("V:1\nN:0:Test\nI:2:3:1\nD:First.\nD:Second.\n");
        let value = export(records);
        assert_eq!(
            value,
            json!({"abilities": [{
                "id": 0,
                "name": "Test",
                "skill_id": 2,
                "ability_value": 3,
                "level_requirement": 1,
                "description": "First. Second.",
            }]})
        );
    }

    #[test]
    fn test_export_has_no_null_or_empty_values() {
        let records = parse("N:0:Bare\n");
        let value = export(records);
        assert_eq!(value, json!({"abilities": [{"id": 0, "name": "Bare"}]}));
    }
}
