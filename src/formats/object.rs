//! The object kind format.
//!
//! ```text
//! N: serial number : & object name~
//! G: symbol : color
//! I: tval : sval : pval
//! W: depth : rarity : weight : cost
//! P: attack bonus : damage dice : evasion bonus : protection dice
//! A: depth/rarity allocation pairs
//! B: skill/ability reference
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
use crate::validation::rules::{is_dice, is_numeric, is_pair};

use super::{load_records, numeric_field, push_description, signed_field, split_flags};

pub static SCHEMA: Schema = Schema {
    name: "object",
    label: "Object",
    plural: "objects",
    count_label: "object",
    file_name: "object.txt",
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
                        name: "tval",
                        kind: FieldKind::Numeric,
                    },
                    FieldCheck {
                        name: "sval",
                        kind: FieldKind::Numeric,
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
                // Some entries carry an extra trailing field
                arity: Arity::Between(5, 6),
                fields: &[
                    FieldCheck {
                        name: "attack_bonus",
                        kind: FieldKind::Bonus,
                    },
                    FieldCheck {
                        name: "damage",
                        kind: FieldKind::Dice,
                    },
                    FieldCheck {
                        name: "evasion_bonus",
                        kind: FieldKind::Bonus,
                    },
                    FieldCheck {
                        name: "protection",
                        kind: FieldKind::Dice,
                    },
                ],
                strip_inline_comment: false,
            },
        ),
        (
            'A',
            LineKind::PairList {
                style: PairStyle::Allocation,
            },
        ),
        ('B', LineKind::SinglePair),
        ('F', LineKind::FreeText),
        ('D', LineKind::FreeText),
    ],
    identity: Identity::NumericId {
        ordering: IdOrdering::Strict,
    },
    validity: Validity::ErrorsOnly,
    limit: Some(LimitSpec {
        code: 'K',
        banner: "object kinds",
        kind: LimitKind::MaxCountWithAbility,
    }),
    colors: Some(ColorPolicy {
        extended: &["D1", "g1", "s1", "U1", "v1", "W1", "y1"],
        unknown_is_error: false,
    }),
    colon_symbol_escape: false,
    seq_checks: &[],
};

/// An allocation entry (depth/rarity pair).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub depth: i64,
    pub rarity: i64,
}

/// An ability reference (B: line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityRef {
    pub skill_id: i64,
    pub ability_id: i64,
}

/// An object kind record.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectKind {
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
    pub allocations: Vec<Allocation>,
    pub abilities: Vec<AbilityRef>,
    pub flags: Vec<String>,
    pub description: Option<String>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = ObjectKind;

    fn start(&self, parts: &[String], _line: &str) -> Option<ObjectKind> {
        if parts.len() < 3 || !is_numeric(&parts[1]) {
            return None;
        }
        Some(ObjectKind {
            id: parts[1].parse().ok()?,
            // Names may contain colons, so re-join the tail
            name: parts[2..].join(":"),
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
            allocations: Vec::new(),
            abilities: Vec::new(),
            flags: Vec::new(),
            description: None,
        })
    }

    fn attr(&self, record: &mut ObjectKind, tag: char, parts: &[String], line: &str, _raw: &str) {
        match tag {
            'G' if parts.len() >= 3 => {
                record.symbol = Some(parts[1].clone());
                record.color = Some(parts[2].clone());
            }
            'I' if parts.len() >= 4 => {
                if let Some(v) = numeric_field(&parts[1]) {
                    record.tval = Some(v);
                }
                if let Some(v) = numeric_field(&parts[2]) {
                    record.sval = Some(v);
                }
                if let Some(v) = signed_field(&parts[3]) {
                    record.pval = Some(v);
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
                    record.weight = Some(v);
                }
                if let Some(v) = numeric_field(&parts[4]) {
                    record.cost = Some(v);
                }
            }
            'P' => {
                let (attack, damage, evasion, protection) = parse_p_line(parts);
                record.attack_bonus = attack;
                record.damage_dice = damage;
                record.evasion_bonus = evasion;
                record.protection_dice = protection;
            }
            'A' => {
                for piece in &parts[1..] {
                    if let Some(alloc) = parse_allocation(piece) {
                        record.allocations.push(alloc);
                    }
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
            'D' => {
                push_description(&mut record.description, line.get(2..).unwrap_or("").trim());
            }
            _ => {}
        }
    }
}

/// Parse an allocation piece like `5/3`.
pub(super) fn parse_allocation(piece: &str) -> Option<Allocation> {
    if !is_pair(piece) {
        return None;
    }
    let (depth, rarity) = piece.split_once('/')?;
    Some(Allocation {
        depth: depth.parse().ok()?,
        rarity: rarity.parse().ok()?,
    })
}

/// Parse an ability piece like `4/2`.
pub(super) fn parse_ability(piece: &str) -> Option<AbilityRef> {
    if !is_pair(piece) {
        return None;
    }
    let (skill, ability) = piece.split_once('/')?;
    Some(AbilityRef {
        skill_id: skill.parse().ok()?,
        ability_id: ability.parse().ok()?,
    })
}

/// Extract the four combat values from a P: line, dropping fields that
/// fail their pattern.
fn parse_p_line(parts: &[String]) -> (Option<i64>, Option<String>, Option<i64>, Option<String>) {
    if parts.len() < 5 {
        return (None, None, None, None);
    }
    let bonus = |s: &str| {
        let trimmed = s.strip_prefix('+').unwrap_or(s);
        if is_numeric(trimmed.strip_prefix('-').unwrap_or(trimmed)) {
            trimmed.parse().ok()
        } else {
            None
        }
    };
    let dice = |s: &String| {
        if is_dice(s) {
            Some(s.clone())
        } else {
            None
        }
    };
    (
        bonus(&parts[1]),
        dice(&parts[2]),
        bonus(&parts[3]),
        dice(&parts[4]),
    )
}

pub fn load(path: &Path) -> Vec<ObjectKind> {
    load_records(&SCHEMA, path, &Sink)
}

pub fn export(mut records: Vec<ObjectKind>) -> Value {
    for record in &mut records {
        record.flags.sort();
    }
    envelope(SCHEMA.plural, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::ResolvedLimits;
    use crate::parser::assemble;
    use crate::schema::Validity;
    use crate::validation::validate_source;

    const SWORD: &str = "V:1\n\
        N:42:& Longsword~\n\
        G:|:W\n\
        I:23:17:0\n\
        W:5:0:30:300\n\
        P:+0:2d5:+1:0d0\n\
        A:5/1:20/2\n\
        B:0/12\n\
        F:SHARP\n\
        D:A classic weapon of the Edain.\n";

    #[test]
    fn test_parse_full_record() {
        let records = assemble(&SCHEMA, SWORD, &Sink);
        assert_eq!(records.len(), 1);
        let o = &records[0];
        assert_eq!(o.id, 42);
        assert_eq!(o.name, "& Longsword~");
        assert_eq!(o.attack_bonus, Some(0));
        assert_eq!(o.damage_dice.as_deref(), Some("2d5"));
        assert_eq!(o.evasion_bonus, Some(1));
        assert_eq!(
            o.allocations,
            vec![
                Allocation { depth: 5, rarity: 1 },
                Allocation { depth: 20, rarity: 2 },
            ]
        );
        assert_eq!(
            o.abilities,
            vec![AbilityRef { skill_id: 0, ability_id: 12 }]
        );
    }

    #[test]
    fn test_validates_clean() {
        let result = validate_source(&SCHEMA, SWORD, None);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
    }

    #[test]
    fn test_ability_limit_cross_check() {
        let limits = ResolvedLimits {
            max_count: 600,
            max_id: Some(599),
            citation: "M:K:600".to_string(),
            max_ability_id: Some(239),
        };
        let result = validate_source(&SCHEMA, "V:1\nN:0:Test\nB:0/250\n", Some(&limits));
        assert_eq!(
            result.errors,
            vec!["Line 3: B: ability_id 250 exceeds max 239"]
        );
    }

    #[test]
    fn test_unknown_color_warns_and_validity_ignores_it() {
        let result = validate_source(&SCHEMA, "V:1\nN:0:Test\nG:!:Q9\n", None);
        assert!(result.errors.is_empty());
        assert_eq!(result.warning_count(), 1);
        assert!(result.is_valid(Validity::ErrorsOnly));
    }

    #[test]
    fn test_plus_bonus_parses() {
        let parts: Vec<String> = "P:+2:1d8:-1:0d0".split(':').map(str::to_string).collect();
        let (attack, damage, evasion, protection) = parse_p_line(&parts);
        assert_eq!(attack, Some(2));
        assert_eq!(damage.as_deref(), Some("1d8"));
        assert_eq!(evasion, Some(-1));
        assert_eq!(protection.as_deref(), Some("0d0"));
    }
}
