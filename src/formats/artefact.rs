//! The artefact format.
//!
//! ```text
//! N: serial number : item name
//! G: char : attr
//! I: tval : sval : pval
//! B: ability references (skill/ability pairs)
//! W: depth : rarity : weight : cost
//! P: attack bonus : damage dice : evasion bonus : protection dice
//! F: flags
//! D: description
//! ```

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::export::envelope;
use crate::parser::RecordSink;
use crate::schema::{
    Arity, ColorPolicy, FieldCheck, FieldKind, IdOrdering, Identity, LimitKind, LimitSpec,
    LineKind, PairStyle, Schema, Validity,
};
use crate::validation::rules::{is_numeric, is_pair};

use super::{load_records, numeric_field, push_description, signed_field, split_flags};

pub static SCHEMA: Schema = Schema {
    name: "artefact",
    label: "Artefact",
    plural: "artefacts",
    count_label: "artefact",
    file_name: "artefact.txt",
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
                        name: "char",
                        kind: FieldKind::Any,
                    },
                    FieldCheck {
                        name: "attr",
                        kind: FieldKind::Color,
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
                        name: "tval",
                        kind: FieldKind::Int,
                    },
                    FieldCheck {
                        name: "sval",
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
            'B',
            LineKind::PairList {
                style: PairStyle::AbilityRef,
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
                        name: "weight",
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
            'P',
            LineKind::Fields {
                // Crowns and light sources carry a 6th, always-zero field
                arity: Arity::Either(5, 6),
                fields: &[
                    FieldCheck {
                        name: "attack bonus",
                        kind: FieldKind::Bonus,
                    },
                    FieldCheck {
                        name: "damage dice",
                        kind: FieldKind::Dice,
                    },
                    FieldCheck {
                        name: "evasion bonus",
                        kind: FieldKind::Bonus,
                    },
                    FieldCheck {
                        name: "protection dice",
                        kind: FieldKind::Dice,
                    },
                ],
                strip_inline_comment: false,
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
        code: 'A',
        banner: "artefacts",
        kind: LimitKind::ArtefactPair,
    }),
    colors: Some(ColorPolicy {
        extended: &["b1"],
        unknown_is_error: true,
    }),
    colon_symbol_escape: false,
    seq_checks: &[],
};

/// An ability reference (B: line entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityRef {
    pub skill_id: i64,
    pub ability_id: i64,
}

/// An artefact record.
#[derive(Debug, Clone, Serialize)]
pub struct Artefact {
    pub id: i64,
    pub name: String,
    pub symbol: Option<String>,
    pub color: Option<String>,
    pub tval: Option<i64>,
    pub sval: Option<i64>,
    pub pval: Option<i64>,
    pub depth: Option<i64>,
    pub rarity: Option<i64>,
    pub weight: Option<i64>,
    pub cost: Option<i64>,
    pub attack_bonus: Option<i64>,
    pub damage_dice: Option<String>,
    pub evasion_bonus: Option<i64>,
    pub protection_dice: Option<String>,
    pub abilities: Vec<AbilityRef>,
    pub flags: Vec<String>,
    pub description: Option<String>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = Artefact;

    fn start(&self, parts: &[String], _line: &str) -> Option<Artefact> {
        if parts.len() < 3 || !is_numeric(&parts[1]) {
            return None;
        }
        Some(Artefact {
            id: parts[1].parse().ok()?,
            name: parts[2].clone(),
            symbol: None,
            color: None,
            tval: None,
            sval: None,
            pval: None,
            depth: None,
            rarity: None,
            weight: None,
            cost: None,
            attack_bonus: None,
            damage_dice: None,
            evasion_bonus: None,
            protection_dice: None,
            abilities: Vec::new(),
            flags: Vec::new(),
            description: None,
        })
    }

    fn attr(&self, record: &mut Artefact, tag: char, parts: &[String], line: &str, _raw: &str) {
        match tag {
            'G' if parts.len() >= 3 => {
                record.symbol = Some(parts[1].clone());
                record.color = Some(parts[2].clone());
            }
            'I' if parts.len() >= 4 => {
                if let Some(v) = signed_field(&parts[1]) {
                    record.tval = Some(v);
                }
                if let Some(v) = signed_field(&parts[2]) {
                    record.sval = Some(v);
                }
                if let Some(v) = signed_field(&parts[3]) {
                    record.pval = Some(v);
                }
            }
            'B' => {
                record.abilities.extend(parse_abilities(line));
            }
            'W' if parts.len() >= 5 => {
                if let Some(v) = numeric_field(&parts[1]) {
                    record.depth = Some(v);
                }
                if let Some(v) = numeric_field(&parts[2]) {
                    record.rarity = Some(v);
                }
                if let Some(v) = numeric_field(&parts[3]) {
                    record.weight = Some(v);
                }
                if let Some(v) = numeric_field(&parts[4]) {
                    record.cost = Some(v);
                }
            }
            'P' if parts.len() >= 5 => {
                if let Some(v) = signed_field(&parts[1]) {
                    record.attack_bonus = Some(v);
                }
                record.damage_dice = Some(parts[2].clone());
                if let Some(v) = signed_field(&parts[3]) {
                    record.evasion_bonus = Some(v);
                }
                record.protection_dice = Some(parts[4].clone());
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

/// Parse a B: line into ability references; the legacy flag form yields
/// nothing.
fn parse_abilities(line: &str) -> Vec<AbilityRef> {
    let content = line.get(2..).unwrap_or("");
    if content.contains('|') && content.chars().any(|c| c.is_ascii_uppercase() || c == '_') {
        return Vec::new();
    }

    let mut abilities = Vec::new();
    for piece in content.split(':') {
        let piece = piece.trim();
        if is_pair(piece) {
            let (skill, ability) = piece.split_once('/').unwrap();
            abilities.push(AbilityRef {
                skill_id: skill.parse().unwrap_or(0),
                ability_id: ability.parse().unwrap_or(0),
            });
        }
    }
    abilities
}

pub fn load(path: &Path) -> Vec<Artefact> {
    load_records(&SCHEMA, path, &Sink)
}

pub fn export(mut records: Vec<Artefact>) -> Value {
    for record in &mut records {
        record.flags.sort();
    }
    envelope(SCHEMA.plural, &records)
}
