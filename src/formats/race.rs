//! The player race format.
//!
//! ```text
//! N: serial number : race name
//! S: str : dex : con : gra
//! I: history : agebase : agemax
//! H: hgt : modhgt
//! W: wgt : modwgt
//! C: allowed house IDs (pipe-separated)
//! E: starting equipment (tval : sval : min : max)
//! F: racial flags
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

use super::{load_records, numeric_field, push_description, signed_field, split_flags};

pub static SCHEMA: Schema = Schema {
    name: "race",
    label: "Race",
    plural: "races",
    count_label: "race",
    file_name: "race.txt",
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
            'S',
            LineKind::Fields {
                arity: Arity::Exact(5),
                fields: &[
                    FieldCheck {
                        name: "str",
                        kind: FieldKind::Int,
                    },
                    FieldCheck {
                        name: "dex",
                        kind: FieldKind::Int,
                    },
                    FieldCheck {
                        name: "con",
                        kind: FieldKind::Int,
                    },
                    FieldCheck {
                        name: "gra",
                        kind: FieldKind::Int,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        (
            'I',
            LineKind::Fields {
                arity: Arity::Exact(4),
                fields: &[
                    FieldCheck {
                        name: "history",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "agebase",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "agemax",
                        kind: FieldKind::Numeric,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        (
            'H',
            LineKind::Fields {
                arity: Arity::Exact(3),
                fields: &[
                    FieldCheck {
                        name: "hgt",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "modhgt",
                        kind: FieldKind::Numeric,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        (
            'W',
            LineKind::Fields {
                arity: Arity::Exact(3),
                fields: &[
                    FieldCheck {
                        name: "wgt",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "modwgt",
                        kind: FieldKind::Numeric,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        ('C', LineKind::PipeNumbers { name: "house ID" }),
        (
            'E',
            LineKind::Fields {
                arity: Arity::Exact(5),
                fields: &[
                    FieldCheck {
                        name: "tval",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "sval",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "min",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "max",
                        kind: FieldKind::Numeric,
                    },
                ],
                strip_inline_comment: true,
            },
        ),
        ('F', LineKind::FreeText),
        ('D', LineKind::FreeText),
    ],
    identity: Identity::NumericId {
        ordering: IdOrdering::Strict,
    },
    validity: Validity::ErrorsAndWarnings,
    limit: Some(LimitSpec {
        code: 'P',
        banner: "player races",
        kind: LimitKind::MaxCount,
    }),
    colors: None,
    colon_symbol_escape: false,
    seq_checks: &[],
};

/// Starting equipment entry (E: line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Equipment {
    pub tval: i64,
    pub sval: i64,
    pub min_amount: i64,
    pub max_amount: i64,
}

/// A race record.
#[derive(Debug, Clone, Serialize)]
pub struct Race {
    pub id: i64,
    pub name: String,
    pub str_mod: Option<i64>,
    pub dex_mod: Option<i64>,
    pub con_mod: Option<i64>,
    pub gra_mod: Option<i64>,
    pub history: Option<i64>,
    pub age_base: Option<i64>,
    pub age_max: Option<i64>,
    pub height_base: Option<i64>,
    pub height_mod: Option<i64>,
    pub weight_base: Option<i64>,
    pub weight_mod: Option<i64>,
    pub houses: Vec<i64>,
    pub flags: Vec<String>,
    pub equipment: Vec<Equipment>,
    pub description: Option<String>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = Race;

    fn start(&self, parts: &[String], _line: &str) -> Option<Race> {
        if parts.len() < 3 || !is_numeric(&parts[1]) {
            return None;
        }
        Some(Race {
            id: parts[1].parse().ok()?,
            name: parts[2].clone(),
            str_mod: None,
            dex_mod: None,
            con_mod: None,
            gra_mod: None,
            history: None,
            age_base: None,
            age_max: None,
            height_base: None,
            height_mod: None,
            weight_base: None,
            weight_mod: None,
            houses: Vec::new(),
            flags: Vec::new(),
            equipment: Vec::new(),
            description: None,
        })
    }

    fn attr(&self, record: &mut Race, tag: char, parts: &[String], line: &str, _raw: &str) {
        match tag {
            'S' if parts.len() >= 5 => {
                if let Some(v) = signed_field(&parts[1]) {
                    record.str_mod = Some(v);
                }
                if let Some(v) = signed_field(&parts[2]) {
                    record.dex_mod = Some(v);
                }
                if let Some(v) = signed_field(&parts[3]) {
                    record.con_mod = Some(v);
                }
                if let Some(v) = signed_field(&parts[4]) {
                    record.gra_mod = Some(v);
                }
            }
            'I' if parts.len() >= 4 => {
                if let Some(v) = numeric_field(&parts[1]) {
                    record.history = Some(v);
                }
                if let Some(v) = numeric_field(&parts[2]) {
                    record.age_base = Some(v);
                }
                if let Some(v) = numeric_field(&parts[3]) {
                    record.age_max = Some(v);
                }
            }
            'H' if parts.len() >= 3 => {
                if let Some(v) = numeric_field(&parts[1]) {
                    record.height_base = Some(v);
                }
                if let Some(v) = numeric_field(&parts[2]) {
                    record.height_mod = Some(v);
                }
            }
            'W' if parts.len() >= 3 => {
                if let Some(v) = numeric_field(&parts[1]) {
                    record.weight_base = Some(v);
                }
                if let Some(v) = numeric_field(&parts[2]) {
                    record.weight_mod = Some(v);
                }
            }
            'C' if parts.len() >= 2 => {
                for house in parts[1].split('|') {
                    if let Some(v) = numeric_field(house) {
                        record.houses.push(v);
                    }
                }
            }
            'E' => {
                if let Some(equipment) = parse_equipment(line) {
                    record.equipment.push(equipment);
                }
            }
            'F' => {
                record.flags.extend(split_flags(line.get(2..).unwrap_or("")));
            }
            'D' => {
                push_description(&mut record.description, line.get(2..).unwrap_or("").trim());
            }
            _ => {}
        }
    }
}

/// Parse an E: line, tolerating an inline `#` comment.
fn parse_equipment(line: &str) -> Option<Equipment> {
    let line = line.split('#').next().unwrap_or(line).trim();
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() != 5 {
        return None;
    }
    Some(Equipment {
        tval: parts[1].trim().parse().ok()?,
        sval: parts[2].trim().parse().ok()?,
        min_amount: parts[3].trim().parse().ok()?,
        max_amount: parts[4].trim().parse().ok()?,
    })
}

pub fn load(path: &Path) -> Vec<Race> {
    load_records(&SCHEMA, path, &Sink)
}

pub fn export(mut records: Vec<Race>) -> Value {
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

    const NOLDOR: &str = "V:1\n\
        N:1:Noldor\n\
        S:0:1:-1:1\n\
        I:14:50:350\n\
        H:70:4\n\
        W:150:15\n\
        C:0|1|2\n\
        E:23:17:1:1 # longsword\n\
        F:MEL_AFFINITY\n\
        D:The Deep Elves.\n";

    #[test]
    fn test_parse_full_record() {
        let records = assemble(&SCHEMA, NOLDOR, &Sink);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.name, "Noldor");
        assert_eq!(r.con_mod, Some(-1));
        assert_eq!(r.history, Some(14));
        assert_eq!(r.height_base, Some(70));
        assert_eq!(r.weight_mod, Some(15));
        assert_eq!(r.houses, vec![0, 1, 2]);
        assert_eq!(
            r.equipment,
            vec![Equipment { tval: 23, sval: 17, min_amount: 1, max_amount: 1 }]
        );
    }

    #[test]
    fn test_validates_clean() {
        let result = validate_source(&SCHEMA, NOLDOR, None);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_bad_house_id_reported() {
        let result = validate_source(&SCHEMA, "V:1\nN:1:Test\nC:0|x|2\n", None);
        assert_eq!(
            result.errors,
            vec!["Line 3: C: house ID is not numeric: x"]
        );
    }
}
