//! The special item type format.
//!
//! ```text
//! N: serial number : special type
//! C: max att : plus damage dice : plus damage sides : max evn
//!    : plus prot dice : plus prot sides : pval
//! W: depth : rarity : max_depth : cost
//! T: tval : min_sval : max_sval
//! B: skill/ability reference
//! F: flags
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

use super::object::{parse_ability, AbilityRef};
use super::{load_records, numeric_field, signed_field, split_flags};

pub static SCHEMA: Schema = Schema {
    name: "special",
    label: "Special",
    plural: "specials",
    count_label: "special",
    file_name: "special.txt",
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
            'C',
            LineKind::Fields {
                arity: Arity::Exact(8),
                fields: &[
                    FieldCheck {
                        name: "max_att",
                        kind: FieldKind::Int,
                    },
                    FieldCheck {
                        name: "plus_damage_dice",
                        kind: FieldKind::Int,
                    },
                    FieldCheck {
                        name: "plus_damage_sides",
                        kind: FieldKind::Int,
                    },
                    FieldCheck {
                        name: "max_evn",
                        kind: FieldKind::Int,
                    },
                    FieldCheck {
                        name: "plus_prot_dice",
                        kind: FieldKind::Int,
                    },
                    FieldCheck {
                        name: "plus_prot_sides",
                        kind: FieldKind::Int,
                    },
                    FieldCheck {
                        name: "pval",
                        kind: FieldKind::Int,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        (
            'W',
            LineKind::Fields {
                arity: Arity::Exact(5),
                fields: &[
                    FieldCheck {
                        name: "depth",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "rarity",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "max_depth",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "cost",
                        kind: FieldKind::Numeric,
                    },
                ],
                strip_inline_comment: false,
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
                        name: "min_sval",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "max_sval",
                        kind: FieldKind::Numeric,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        ('B', LineKind::SinglePair),
        ('F', LineKind::FreeText),
    ],
    identity: Identity::NumericId {
        ordering: IdOrdering::Strict,
    },
    validity: Validity::ErrorsAndWarnings,
    limit: Some(LimitSpec {
        code: 'E',
        banner: "special types",
        kind: LimitKind::MaxCountWithAbility,
    }),
    colors: None,
    colon_symbol_escape: false,
    seq_checks: &[],
};

/// A tval/sval range entry (T: line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TvalRange {
    pub tval: i64,
    pub min_sval: i64,
    pub max_sval: i64,
}

/// A special item record.
#[derive(Debug, Clone, Serialize)]
pub struct Special {
    pub id: i64,
    pub name: String,
    pub max_att: Option<i64>,
    pub plus_damage_dice: Option<i64>,
    pub plus_damage_sides: Option<i64>,
    pub max_evn: Option<i64>,
    pub plus_prot_dice: Option<i64>,
    pub plus_prot_sides: Option<i64>,
    pub pval: Option<i64>,
    pub depth: Option<i64>,
    pub rarity: Option<i64>,
    pub max_depth: Option<i64>,
    pub cost: Option<i64>,
    pub tval_ranges: Vec<TvalRange>,
    pub abilities: Vec<AbilityRef>,
    pub flags: Vec<String>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = Special;

    fn start(&self, parts: &[String], _line: &str) -> Option<Special> {
        if parts.len() < 3 || !is_numeric(&parts[1]) {
            return None;
        }
        Some(Special {
            id: parts[1].parse().ok()?,
            // Names may contain colons, so re-join the tail
            name: parts[2..].join(":"),
            max_att: None,
            plus_damage_dice: None,
            plus_damage_sides: None,
            max_evn: None,
            plus_prot_dice: None,
            plus_prot_sides: None,
            pval: None,
            depth: None,
            rarity: None,
            max_depth: None,
            cost: None,
            tval_ranges: Vec::new(),
            abilities: Vec::new(),
            flags: Vec::new(),
        })
    }

    fn attr(&self, record: &mut Special, tag: char, parts: &[String], line: &str, _raw: &str) {
        match tag {
            'C' if parts.len() >= 8 => {
                let slots: [&mut Option<i64>; 7] = [
                    &mut record.max_att,
                    &mut record.plus_damage_dice,
                    &mut record.plus_damage_sides,
                    &mut record.max_evn,
                    &mut record.plus_prot_dice,
                    &mut record.plus_prot_sides,
                    &mut record.pval,
                ];
                for (slot, value) in slots.into_iter().zip(&parts[1..8]) {
                    if let Some(v) = signed_field(value) {
                        *slot = Some(v);
                    }
                }
            }
            'W' if parts.len() >= 5 => {
                if let Some(v) = numeric_field(&parts[1]) {
                    record.depth = Some(v);
                }
                if let Some(v) = numeric_field(&parts[2]) {
                    record.rarity = Some(v);
                }
                if let Some(v) = numeric_field(&parts[3]) {
                    record.max_depth = Some(v);
                }
                if let Some(v) = numeric_field(&parts[4]) {
                    record.cost = Some(v);
                }
            }
            'T' if parts.len() >= 4 => {
                if let (Some(tval), Some(min_sval), Some(max_sval)) = (
                    numeric_field(&parts[1]),
                    numeric_field(&parts[2]),
                    numeric_field(&parts[3]),
                ) {
                    record.tval_ranges.push(TvalRange {
                        tval,
                        min_sval,
                        max_sval,
                    });
                }
            }
            'B' if parts.len() >= 2 => {
                if let Some(ability) = parse_ability(&parts[1]) {
                    record.abilities.push(ability);
                }
            }
            'F' => {
                record.flags.extend(split_flags(line.get(2..).unwrap_or("")));
            }
            _ => {}
        }
    }
}

pub fn load(path: &Path) -> Vec<Special> {
    load_records(&SCHEMA, path, &Sink)
}

pub fn export(mut records: Vec<Special>) -> Value {
    for record in &mut records {
        record.flags.sort();
    }
    envelope(SCHEMA.plural, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::assemble;
    use crate::validation::validate_source;

    const DOOM: &str = "V:1\n\
        N:7:of Doom\n\
        C:-1:0:0:-1:0:0:-2\n\
        W:10:3:0:1000\n\
        T:23:0:99\n\
        B:4/11\n\
        F:CURSED\n";

    #[test]
    fn test_parse_full_record() {
        let records = assemble(&SCHEMA, DOOM, &Sink);
        assert_eq!(records.len(), 1);
        let s = &records[0];
        assert_eq!(s.name, "of Doom");
        assert_eq!(s.max_att, Some(-1));
        assert_eq!(s.pval, Some(-2));
        assert_eq!(s.max_depth, Some(0));
        assert_eq!(
            s.tval_ranges,
            vec![TvalRange { tval: 23, min_sval: 0, max_sval: 99 }]
        );
        assert_eq!(s.abilities, vec![AbilityRef { skill_id: 4, ability_id: 11 }]);
        assert_eq!(s.flags, vec!["CURSED"]);
    }

    #[test]
    fn test_validates_clean() {
        let result = validate_source(&SCHEMA, DOOM, None);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_name_with_colon_joined() {
        let records = assemble(&SCHEMA, "N:1:of Power: Greater\n", &Sink);
        assert_eq!(records[0].name, "of Power: Greater");
    }

    #[test]
    fn test_c_line_arity_error() {
        let result = validate_source(&SCHEMA, "V:1\nN:1:of Rage\nC:1:2:3\n", None);
        assert_eq!(
            result.errors,
            vec!["Line 3: C: line has 4 fields, expected 8: C:1:2:3"]
        );
    }
}
