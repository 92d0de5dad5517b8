//! The monster format.
//!
//! ```text
//! N: serial number : monster name
//! W: depth : rarity
//! G: symbol : color
//! I: speed : health dice : light radius
//! A: sleepiness : perception : stealth : will
//! P: [evasion bonus, protection dice]
//! B: method : effect : (attack bonus, damage dice)
//! S: spell flags (first line carries SPELL_PCT_X)
//! F: flags
//! D: description
//! ```
//!
//! Light radius may be negative when the creature radiates darkness.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::export::envelope;
use crate::parser::RecordSink;
use crate::schema::{
    Arity, ColorPolicy, FieldCheck, FieldKind, IdOrdering, Identity, LimitKind, LimitSpec,
    LineKind, Schema, SeqCheck, Validity,
};
use crate::validation::rules::{is_dice, is_numeric, is_signed};

use super::{load_records, numeric_field, push_description, split_flags};

static PROTECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([+-]\d+)(?:,(\d+d\d+))?\]").unwrap());
static DAMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([+-]\d+)(?:,(\d+d\d+))?\)").unwrap());
static SPELL_PCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^SPELL_PCT_(\d+)").unwrap());
static SPELL_POW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^POW_(\d+)").unwrap());

pub static SCHEMA: Schema = Schema {
    name: "monster",
    label: "Monster",
    plural: "monsters",
    count_label: "monster",
    file_name: "monster.txt",
    starter: 'N',
    starter_rule: LineKind::Fields {
        arity: Arity::Exact(3),
        fields: &[FieldCheck {
            name: "ID",
            kind: FieldKind::Numeric,
        }],
        strip_inline_comment: false,
    },
    tags: &[
        (
            'W',
            LineKind::Fields {
                arity: Arity::Exact(3),
                fields: &[
                    FieldCheck {
                        name: "depth",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "rarity",
                        kind: FieldKind::Numeric,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
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
        (
            'I',
            LineKind::Fields {
                arity: Arity::Exact(4),
                fields: &[
                    FieldCheck {
                        name: "speed",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "health",
                        kind: FieldKind::Dice,
                    },
                    FieldCheck {
                        name: "light radius",
                        kind: FieldKind::Int,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        (
            'A',
            LineKind::Fields {
                arity: Arity::Exact(5),
                fields: &[
                    FieldCheck {
                        name: "sleepiness",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "perception",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "stealth",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "will",
                        kind: FieldKind::Numeric,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        (
            'P',
            LineKind::Fields {
                arity: Arity::Exact(2),
                fields: &[FieldCheck {
                    name: "protection",
                    kind: FieldKind::ProtectionBracket,
                }],
                strip_inline_comment: false,
            },
        ),
        (
            'B',
            LineKind::Fields {
                // Effect and damage are optional
                arity: Arity::Between(2, 4),
                fields: &[
                    FieldCheck {
                        name: "method",
                        kind: FieldKind::Any,
                    },
                    FieldCheck {
                        name: "effect",
                        kind: FieldKind::Any,
                    },
                    FieldCheck {
                        name: "damage",
                        kind: FieldKind::DamageParen,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        ('S', LineKind::FreeText),
        ('F', LineKind::FreeText),
        ('D', LineKind::FreeText),
    ],
    identity: Identity::NumericId {
        ordering: IdOrdering::Strict,
    },
    validity: Validity::ErrorsOnly,
    limit: Some(LimitSpec {
        code: 'R',
        banner: "monster races",
        kind: LimitKind::MaxCount,
    }),
    colors: Some(ColorPolicy {
        extended: &["D1", "v1", "y1", "U1", "G1", "B1", "b1"],
        unknown_is_error: false,
    }),
    colon_symbol_escape: false,
    seq_checks: &[SeqCheck::FirstSpellLinePct],
};

/// A monster attack (B: line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attack {
    pub method: String,
    pub effect: Option<String>,
    pub attack_bonus: Option<i64>,
    pub damage_dice: Option<String>,
}

/// Spell information accumulated from S: lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpellInfo {
    pub frequency: Option<i64>,
    pub power: Option<i64>,
    pub spells: Vec<String>,
}

/// A monster record.
#[derive(Debug, Clone, Serialize)]
pub struct Monster {
    pub id: i64,
    pub name: String,
    pub depth: Option<i64>,
    pub rarity: Option<i64>,
    pub symbol: Option<String>,
    pub color: Option<String>,
    pub speed: Option<i64>,
    pub health_dice: Option<String>,
    pub light_radius: Option<i64>,
    pub sleepiness: Option<i64>,
    pub perception: Option<i64>,
    pub stealth: Option<i64>,
    pub will: Option<i64>,
    pub evasion_bonus: Option<i64>,
    pub protection_dice: Option<String>,
    pub attacks: Vec<Attack>,
    pub spell_info: Option<SpellInfo>,
    pub flags: Vec<String>,
    pub description: Option<String>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = Monster;

    fn start(&self, parts: &[String], _line: &str) -> Option<Monster> {
        if parts.len() < 3 || !is_numeric(&parts[1]) {
            return None;
        }
        Some(Monster {
            id: parts[1].parse().ok()?,
            name: parts[2].clone(),
            depth: None,
            rarity: None,
            symbol: None,
            color: None,
            speed: None,
            health_dice: None,
            light_radius: None,
            sleepiness: None,
            perception: None,
            stealth: None,
            will: None,
            evasion_bonus: None,
            protection_dice: None,
            attacks: Vec::new(),
            spell_info: None,
            flags: Vec::new(),
            description: None,
        })
    }

    fn attr(&self, record: &mut Monster, tag: char, parts: &[String], line: &str, _raw: &str) {
        match tag {
            'W' if parts.len() >= 3 => {
                if let Some(v) = numeric_field(&parts[1]) {
                    record.depth = Some(v);
                }
                if let Some(v) = numeric_field(&parts[2]) {
                    record.rarity = Some(v);
                }
            }
            'G' if parts.len() >= 3 => {
                record.symbol = Some(parts[1].clone());
                record.color = Some(parts[2].clone());
            }
            'I' if parts.len() >= 4 => {
                if let Some(v) = numeric_field(&parts[1]) {
                    record.speed = Some(v);
                }
                if is_dice(&parts[2]) {
                    record.health_dice = Some(parts[2].clone());
                }
                if is_signed(&parts[3]) {
                    record.light_radius = parts[3].parse().ok();
                }
            }
            'A' if parts.len() >= 5 => {
                if let Some(v) = numeric_field(&parts[1]) {
                    record.sleepiness = Some(v);
                }
                if let Some(v) = numeric_field(&parts[2]) {
                    record.perception = Some(v);
                }
                if let Some(v) = numeric_field(&parts[3]) {
                    record.stealth = Some(v);
                }
                if let Some(v) = numeric_field(&parts[4]) {
                    record.will = Some(v);
                }
            }
            'P' if parts.len() >= 2 => {
                let (evasion, protection) = parse_protection(&parts[1]);
                record.evasion_bonus = evasion;
                record.protection_dice = protection;
            }
            'B' => {
                if let Some(attack) = parse_attack(parts) {
                    record.attacks.push(attack);
                }
            }
            'S' => {
                let info = record.spell_info.get_or_insert_with(SpellInfo::default);
                parse_spell_line(line, info);
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

/// Parse a protection value like `[+1,1d4]` or `[+0]`.
fn parse_protection(value: &str) -> (Option<i64>, Option<String>) {
    match PROTECTION.captures(value) {
        Some(caps) => (
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
            caps.get(2).map(|m| m.as_str().to_string()),
        ),
        None => (None, None),
    }
}

/// Parse a B: line into an attack; bonus and dice come from the optional
/// `(+N,NdM)` fourth field.
fn parse_attack(parts: &[String]) -> Option<Attack> {
    if parts.len() < 2 {
        return None;
    }
    let mut attack = Attack {
        method: parts[1].clone(),
        effect: parts.get(2).cloned(),
        attack_bonus: None,
        damage_dice: None,
    };
    if let Some(damage) = parts.get(3) {
        if let Some(caps) = DAMAGE.captures(damage) {
            attack.attack_bonus = caps.get(1).and_then(|m| m.as_str().parse().ok());
            attack.damage_dice = caps.get(2).map(|m| m.as_str().to_string());
        }
    }
    Some(attack)
}

/// Fold one pipe-delimited S: line into the spell info.
fn parse_spell_line(line: &str, info: &mut SpellInfo) {
    let content = line.get(2..).unwrap_or("");
    for part in content.split('|').map(str::trim) {
        if let Some(caps) = SPELL_PCT.captures(part) {
            info.frequency = caps.get(1).and_then(|m| m.as_str().parse().ok());
            continue;
        }
        if let Some(caps) = SPELL_POW.captures(part) {
            info.power = caps.get(1).and_then(|m| m.as_str().parse().ok());
            continue;
        }
        if !part.is_empty() {
            info.spells.push(part.to_string());
        }
    }
}

pub fn load(path: &Path) -> Vec<Monster> {
    load_records(&SCHEMA, path, &Sink)
}

pub fn export(mut records: Vec<Monster>) -> Value {
    for record in &mut records {
        record.flags.sort();
        if let Some(info) = &mut record.spell_info {
            info.spells.sort();
        }
    }
    envelope(SCHEMA.plural, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::assemble;
    use crate::schema::Validity;
    use crate::validation::validate_source;
    use serde_json::json;

    const WOLF: &str = "V:1\n\
        N:17:Wolf\n\
        W:2:1\n\
        G:C:U\n\
        I:120:3d6:-1\n\
        A:10:5:3:4\n\
        P:[+2,1d6]\n\
        B:BITE:HURT:(+4,1d7)\n\
        B:TOUCH:TERRIFY:(+5)\n\
        S:1_IN_5 | SPELL_PCT_15\n\
        S:SHRIEK\n\
        F:RES_COLD | BAD_TEMPER\n\
        D:A lean and hungry wolf.\n";

    #[test]
    fn test_parse_full_record() {
        let records = assemble(&SCHEMA, WOLF, &Sink);
        assert_eq!(records.len(), 1);
        let m = &records[0];
        assert_eq!(m.id, 17);
        assert_eq!(m.depth, Some(2));
        assert_eq!(m.health_dice.as_deref(), Some("3d6"));
        assert_eq!(m.light_radius, Some(-1));
        assert_eq!(m.evasion_bonus, Some(2));
        assert_eq!(m.protection_dice.as_deref(), Some("1d6"));
        assert_eq!(m.attacks.len(), 2);
        assert_eq!(m.attacks[0].attack_bonus, Some(4));
        assert_eq!(m.attacks[0].damage_dice.as_deref(), Some("1d7"));
        assert_eq!(m.attacks[1].attack_bonus, Some(5));
        assert_eq!(m.attacks[1].damage_dice, None);
        let spells = m.spell_info.as_ref().unwrap();
        assert_eq!(spells.frequency, Some(15));
        assert_eq!(spells.spells, vec!["1_IN_5", "SHRIEK"]);
    }

    #[test]
    fn test_validates_clean() {
        let result = validate_source(&SCHEMA, WOLF, None);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert!(result.is_valid(Validity::ErrorsOnly));
    }

    #[test]
    fn test_protection_without_dice() {
        let (evasion, protection) = parse_protection("[-1]");
        assert_eq!(evasion, Some(-1));
        assert_eq!(protection, None);
    }

    #[test]
    fn test_n_line_requires_exactly_three_fields() {
        let result = validate_source(&SCHEMA, "V:1\nN:0:Orc:extra\n", None);
        assert_eq!(
            result.errors,
            vec!["Line 2: N: line has 4 fields, expected 3: N:0:Orc:extra"]
        );
    }

    #[test]
    fn test_export_sorts_flags_and_spells() {
        let records = assemble(
            &SCHEMA,
            "N:0:Orc\nS:SPELL_PCT_10 | SCREECH | ARROW1\nF:ZEBRA | APPLE\n",
            &Sink,
        );
        let value = export(records);
        let monster = &value["monsters"][0];
        assert_eq!(monster["flags"], json!(["APPLE", "ZEBRA"]));
        assert_eq!(monster["spell_info"]["spells"], json!(["ARROW1", "SCREECH"]));
        assert_eq!(monster["spell_info"]["frequency"], json!(10));
    }

    #[test]
    fn test_power_token_parsed() {
        let mut info = SpellInfo::default();
        parse_spell_line("S:SPELL_PCT_25 | POW_12 | FIRE_BOLT", &mut info);
        assert_eq!(info.frequency, Some(25));
        assert_eq!(info.power, Some(12));
        assert_eq!(info.spells, vec!["FIRE_BOLT"]);
    }
}
