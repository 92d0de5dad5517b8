//! The vault format.
//!
//! ```text
//! N: serial number : vault name
//! X: room type : depth : rarity
//! F: flag1 | flag2 | ...
//! D: layout row (ASCII art)
//! ```
//!
//! Layout rows are the one place where whitespace is data: the content
//! after `D:` is taken from the unstripped line and exported exactly,
//! and all rows of a record must share one width.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::parser::RecordSink;
use crate::schema::{
    Arity, FieldCheck, FieldKind, IdOrdering, Identity, LimitKind, LimitSpec, LineKind, Schema,
    SeqCheck, Validity,
};
use crate::validation::rules::is_numeric;

use super::load_records;

/// Flags a vault may carry.
const VAULT_FLAGS: &[&str] = &["TEST", "NO_ROTATION", "TRAPS", "WEBS", "LIGHT", "SURFACE"];

/// Known room types: interesting room, lesser vault, greater vault,
/// Morgoth's vault, Gates of Angband.
const ROOM_TYPES: &[i64] = &[6, 7, 8, 9, 10];

pub static SCHEMA: Schema = Schema {
    name: "vault",
    label: "Vault",
    plural: "vaults",
    count_label: "vault",
    file_name: "vault.txt",
    starter: 'N',
    starter_rule: LineKind::Fields {
        arity: Arity::AtLeast(3),
        fields: &[FieldCheck {
            name: "serial number",
            kind: FieldKind::Numeric,
        }],
        strip_inline_comment: false,
    },
    tags: &[
        (
            'X',
            LineKind::Fields {
                arity: Arity::Exact(4),
                fields: &[
                    FieldCheck {
                        name: "room type",
                        kind: FieldKind::NumericWarnUnknown { known: ROOM_TYPES },
                    },
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
        ('F', LineKind::FlagList { known: VAULT_FLAGS }),
        ('D', LineKind::FreeText),
    ],
    identity: Identity::NumericId {
        ordering: IdOrdering::AdvisoryNonIncrease,
    },
    validity: Validity::ErrorsAndWarnings,
    limit: Some(LimitSpec {
        code: 'V',
        banner: "vaults",
        kind: LimitKind::MaxCount,
    }),
    colors: None,
    colon_symbol_escape: false,
    seq_checks: &[SeqCheck::LayoutWidths],
};

/// A vault record. Export skips absent fields directly; vault layouts
/// must survive byte-for-byte, so no pruning pass runs over them.
#[derive(Debug, Clone, Serialize)]
pub struct Vault {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub layout: Vec<String>,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = Vault;

    fn start(&self, parts: &[String], _line: &str) -> Option<Vault> {
        if parts.len() < 3 || !is_numeric(&parts[1]) {
            return None;
        }
        Some(Vault {
            id: parts[1].parse().ok()?,
            // Names may contain colons, so re-join the tail
            name: parts[2..].join(":"),
            room_type: None,
            depth: None,
            rarity: None,
            flags: Vec::new(),
            layout: Vec::new(),
        })
    }

    fn attr(&self, record: &mut Vault, tag: char, parts: &[String], line: &str, raw: &str) {
        match tag {
            'X' if parts.len() >= 4 => {
                // Fields apply left to right; a bad one stops the rest
                if let Ok(v) = parts[1].parse() {
                    record.room_type = Some(v);
                    if let Ok(v) = parts[2].parse() {
                        record.depth = Some(v);
                        if let Ok(v) = parts[3].parse() {
                            record.rarity = Some(v);
                        }
                    }
                }
            }
            'F' => {
                let content = line.get(2..).unwrap_or("").trim();
                record.flags = if content.contains('|') {
                    content
                        .split('|')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(str::to_string)
                        .collect()
                } else {
                    content.split_whitespace().map(str::to_string).collect()
                };
            }
            'D' => {
                // Preserve exact content after D: from the original line
                let row = if let Some(rest) = raw.strip_prefix("D:") {
                    rest
                } else if let Some(idx) = raw.find("D:") {
                    &raw[idx + 2..]
                } else {
                    ""
                };
                record.layout.push(row.to_string());
            }
            _ => {}
        }
    }
}

pub fn load(path: &Path) -> Vec<Vault> {
    load_records(&SCHEMA, path, &Sink)
}

/// Vault export serializes records directly: layouts and flags keep file
/// order and whitespace.
pub fn export(records: Vec<Vault>) -> Value {
    let list: Vec<Value> = records
        .iter()
        .filter_map(|r| serde_json::to_value(r).ok())
        .collect();
    let mut root = serde_json::Map::new();
    root.insert(SCHEMA.plural.to_string(), Value::Array(list));
    Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::assemble;
    use crate::validation::validate_source;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const PIT: &str = "V:1\n\
        N:12:Orc pit\n\
        X:7:8:2\n\
        F:TRAPS | LIGHT\n\
        D:%%%%%\n\
        D:%. .%\n\
        D:%%%%%\n";

    #[test]
    fn test_parse_full_record() {
        let records = assemble(&SCHEMA, PIT, &Sink);
        assert_eq!(records.len(), 1);
        let v = &records[0];
        assert_eq!(v.id, 12);
        assert_eq!(v.room_type, Some(7));
        assert_eq!(v.flags, vec!["TRAPS", "LIGHT"]);
        assert_eq!(v.layout, vec!["%%%%%", "%. .%", "%%%%%"]);
    }

    #[test]
    fn test_layout_whitespace_preserved() {
        let records = assemble(&SCHEMA, "N:1:hall\nD:  ##  \nD:  ##  \n", &Sink);
        assert_eq!(records[0].layout, vec!["  ##  ", "  ##  "]);
    }

    #[test]
    fn test_validates_clean() {
        let result = validate_source(&SCHEMA, PIT, None);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_unknown_room_type_and_flag_warn() {
        let result = validate_source(&SCHEMA, "V:1\nN:1:odd\nX:3:5:1\nF:GLOWING\n", None);
        assert!(result.errors.is_empty());
        assert_eq!(
            result.warnings,
            vec![
                "Line 3: X: unknown room type 3",
                "Line 4: F: unknown flag 'GLOWING'"
            ]
        );
    }

    #[test]
    fn test_space_separated_flags() {
        let records = assemble(&SCHEMA, "N:1:open\nF:LIGHT SURFACE\n", &Sink);
        assert_eq!(records[0].flags, vec!["LIGHT", "SURFACE"]);
    }

    #[test]
    fn test_export_keeps_flag_order_and_layout() {
        let records = assemble(&SCHEMA, PIT, &Sink);
        let value = export(records);
        assert_eq!(
            value,
            json!({"vaults": [{
                "id": 12,
                "name": "Orc pit",
                "room_type": 7,
                "depth": 8,
                "rarity": 2,
                "flags": ["TRAPS", "LIGHT"],
                "layout": ["%%%%%", "%. .%", "%%%%%"],
            }]})
        );
    }
}
