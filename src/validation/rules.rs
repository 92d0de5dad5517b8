//! Field-rule validators.
//!
//! One validation algorithm per [`FieldKind`]/[`LineKind`] variant; the
//! thirteen schema tables select among them. All checks accumulate
//! messages into a [`ValidationResult`] and never abort the line; a bad
//! field does not hide the fields after it.

use std::sync::LazyLock;

use regex::Regex;

use crate::schema::{colors, ColorPolicy, FieldCheck, FieldKind, LineKind, PairStyle};

use super::diagnostics::ValidationResult;

static DICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+d\d+$").unwrap());
static PAIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+/\d+$").unwrap());
static PROTECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[+-]\d+(,\d+d\d+)?\]$").unwrap());
static DAMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\([+-]\d+(,\d+d\d+)?\)$").unwrap());

/// Context a line check may need beyond the line itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineContext<'a> {
    pub colors: Option<&'a ColorPolicy>,
    /// Ability ceiling for `B:` cross-checks, when limits resolved.
    pub max_ability_id: Option<i64>,
}

/// Digits only, non-empty.
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Digits with an optional leading `-`.
pub fn is_signed(s: &str) -> bool {
    is_numeric(s.strip_prefix('-').unwrap_or(s))
}

/// Digits with an optional leading `+` or `-`.
pub fn is_bonus(s: &str) -> bool {
    is_numeric(s.strip_prefix(['+', '-']).unwrap_or(s))
}

/// Dice notation `NdM`.
pub fn is_dice(s: &str) -> bool {
    DICE.is_match(s)
}

/// A `digits/digits` pair.
pub fn is_pair(s: &str) -> bool {
    PAIR.is_match(s)
}

/// Run one tag's rule against a line.
///
/// `line` is the trimmed line; `parts` its naive colon split. `lineno` is
/// 1-based.
pub fn check_line(
    kind: &LineKind,
    tag: char,
    parts: &[String],
    line: &str,
    lineno: usize,
    ctx: &LineContext,
    result: &mut ValidationResult,
) {
    match kind {
        LineKind::Fields {
            arity,
            fields,
            strip_inline_comment,
        } => {
            // Inline comments are only legal on a few line types (T:, E:)
            let owned;
            let (line, parts) = if *strip_inline_comment {
                let stripped = line.split('#').next().unwrap_or(line).trim();
                owned = (
                    stripped.to_string(),
                    stripped.split(':').map(str::to_string).collect::<Vec<_>>(),
                );
                (owned.0.as_str(), owned.1.as_slice())
            } else {
                (line, parts)
            };

            if !arity.accepts(parts.len()) {
                result.error(format!(
                    "Line {}: {}: line has {} fields, expected {}: {}",
                    lineno,
                    tag,
                    parts.len(),
                    arity.expected(),
                    line
                ));
                return;
            }

            for (i, check) in fields.iter().enumerate() {
                let Some(value) = parts.get(i + 1) else {
                    break;
                };
                let value = if *strip_inline_comment {
                    value.trim()
                } else {
                    value.as_str()
                };
                check_field(check, tag, value, lineno, ctx, result);
            }
        }

        LineKind::PairList { style } => check_pair_list(*style, tag, parts, line, lineno, result),

        LineKind::SinglePair => {
            if parts.len() != 2 {
                result.error(format!(
                    "Line {}: {}: line has {} fields, expected 2: {}",
                    lineno,
                    tag,
                    parts.len(),
                    line
                ));
                return;
            }
            let value = &parts[1];
            if !is_pair(value) {
                result.error(format!(
                    "Line {}: {}: invalid ability format '{}', expected X/Y",
                    lineno, tag, value
                ));
                return;
            }
            if let Some(max_ability_id) = ctx.max_ability_id {
                // Pattern matched, so both halves parse
                let ability_id: i64 = value.split('/').nth(1).unwrap().parse().unwrap_or(0);
                if ability_id > max_ability_id {
                    result.error(format!(
                        "Line {}: {}: ability_id {} exceeds max {}",
                        lineno, tag, ability_id, max_ability_id
                    ));
                }
            }
        }

        LineKind::FlagList { known } => {
            let content = line.get(2..).unwrap_or("").trim();
            if content.is_empty() {
                return;
            }
            let flags: Vec<&str> = if content.contains('|') {
                content.split('|').map(str::trim).filter(|f| !f.is_empty()).collect()
            } else {
                content.split_whitespace().collect()
            };
            for flag in flags {
                if !known.contains(&flag) {
                    result.warning(format!("Line {}: {}: unknown flag '{}'", lineno, tag, flag));
                }
            }
        }

        LineKind::SingleFlag { known } => {
            if parts.len() < 2 {
                result.error(format!("Line {}: {}: line missing flag: {}", lineno, tag, line));
                return;
            }
            let flag = parts[1].trim();
            if !flag.is_empty() && !known.contains(&flag) {
                result.warning(format!(
                    "Line {}: {}: unrecognized flag '{}'",
                    lineno, tag, flag
                ));
            }
        }

        LineKind::PipeNumbers { name } => {
            if parts.len() != 2 {
                result.error(format!(
                    "Line {}: {}: line has {} fields, expected 2: {}",
                    lineno,
                    tag,
                    parts.len(),
                    line
                ));
                return;
            }
            for piece in parts[1].split('|') {
                if !is_numeric(piece) {
                    result.error(format!(
                        "Line {}: {}: {} is not numeric: {}",
                        lineno, tag, name, piece
                    ));
                }
            }
        }

        LineKind::FreeText => {}

        // Limit declarations are validated by the file validator, which
        // owns the duplicate-code state.
        LineKind::LimitDecl => {}
    }
}

fn check_field(
    check: &FieldCheck,
    tag: char,
    value: &str,
    lineno: usize,
    ctx: &LineContext,
    result: &mut ValidationResult,
) {
    match check.kind {
        FieldKind::Numeric => {
            if !is_numeric(value) {
                result.error(format!(
                    "Line {}: {}: {} is not numeric: {}",
                    lineno, tag, check.name, value
                ));
            }
        }
        FieldKind::SignedNumeric => {
            if !is_signed(value) {
                result.error(format!(
                    "Line {}: {}: {} is not numeric: {}",
                    lineno, tag, check.name, value
                ));
            }
        }
        FieldKind::Int => {
            if !is_signed(value) {
                result.error(format!(
                    "Line {}: {}: {} is not a valid integer: {}",
                    lineno, tag, check.name, value
                ));
            }
        }
        FieldKind::Bonus => {
            if !is_bonus(value) {
                result.error(format!(
                    "Line {}: {}: {} is not a valid integer: {}",
                    lineno, tag, check.name, value
                ));
            }
        }
        FieldKind::Dice => {
            if !is_dice(value) {
                result.error(format!(
                    "Line {}: {}: {} is not valid dice format (NdM): {}",
                    lineno, tag, check.name, value
                ));
            }
        }
        FieldKind::Color => {
            let extended = ctx.colors.map(|p| p.extended).unwrap_or(&[]);
            let unknown_is_error = ctx.colors.map(|p| p.unknown_is_error).unwrap_or(true);
            if !colors::is_valid(value, extended) {
                if unknown_is_error {
                    result.error(format!(
                        "Line {}: {}: unrecognized color '{}'",
                        lineno, tag, value
                    ));
                } else {
                    result.warning(format!(
                        "Line {}: {}: color '{}' not in documented color list",
                        lineno, tag, value
                    ));
                }
            }
        }
        FieldKind::Symbol => {
            if value.chars().count() != 1 {
                result.error(format!(
                    "Line {}: {}: symbol must be a single character, got '{}'",
                    lineno, tag, value
                ));
            }
        }
        FieldKind::ProtectionBracket => {
            if !PROTECTION.is_match(value) {
                result.error(format!(
                    "Line {}: {}: invalid format, expected [+/-N] or [+/-N,NdM]: {}",
                    lineno, tag, value
                ));
            }
        }
        FieldKind::DamageParen => {
            if !DAMAGE.is_match(value) {
                result.error(format!(
                    "Line {}: {}: invalid damage format, expected (+/-N) or (+/-N,NdM): {}",
                    lineno, tag, value
                ));
            }
        }
        FieldKind::NumericRangeWarn { lo, hi } => {
            if !is_numeric(value) {
                result.error(format!(
                    "Line {}: {}: {} is not numeric: {}",
                    lineno, tag, check.name, value
                ));
            } else if let Ok(v) = value.parse::<i64>() {
                if v < lo || v > hi {
                    result.warning(format!(
                        "Line {}: {}: {} {} is outside expected range {}-{}",
                        lineno, tag, check.name, v, lo, hi
                    ));
                }
            }
        }
        FieldKind::NumericWarnUnknown { known } => {
            if !is_numeric(value) {
                result.error(format!(
                    "Line {}: {}: {} is not numeric: {}",
                    lineno, tag, check.name, value
                ));
            } else if let Ok(v) = value.parse::<i64>() {
                if !known.contains(&v) {
                    result.warning(format!(
                        "Line {}: {}: unknown {} {}",
                        lineno, tag, check.name, v
                    ));
                }
            }
        }
        FieldKind::Any => {}
    }
}

fn check_pair_list(
    style: PairStyle,
    tag: char,
    parts: &[String],
    line: &str,
    lineno: usize,
    result: &mut ValidationResult,
) {
    match style {
        PairStyle::Prerequisite | PairStyle::AbilityRef => {
            let content = line.get(2..).unwrap_or("");

            if style == PairStyle::AbilityRef
                && content.contains('|')
                && content.chars().any(|c| c.is_ascii_uppercase() || c == '_')
            {
                // Legacy flag syntax on an ability-reference line
                result.warning(format!(
                    "Line {}: {}: line uses flag format instead of ability references: {}",
                    lineno, tag, line
                ));
                return;
            }

            let what = match style {
                PairStyle::Prerequisite => "prerequisite",
                _ => "ability reference",
            };
            for piece in content.split(':') {
                let piece = piece.trim();
                if !is_pair(piece) {
                    result.error(format!(
                        "Line {}: {}: invalid {} '{}' (expected format: skill/ability)",
                        lineno, tag, what, piece
                    ));
                }
            }
        }
        PairStyle::Allocation => {
            if parts.len() < 2 {
                result.error(format!(
                    "Line {}: {}: line has no allocation data: {}",
                    lineno, tag, line
                ));
                return;
            }
            for piece in &parts[1..] {
                if !is_pair(piece) {
                    result.error(format!(
                        "Line {}: {}: invalid allocation format '{}', expected depth/rarity",
                        lineno, tag, piece
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Arity;

    fn run(kind: &LineKind, tag: char, line: &str) -> ValidationResult {
        let parts: Vec<String> = line.split(':').map(str::to_string).collect();
        let mut result = ValidationResult::new();
        check_line(kind, tag, &parts, line, 1, &LineContext::default(), &mut result);
        result
    }

    #[test]
    fn test_numeric_predicates() {
        assert!(is_numeric("042"));
        assert!(!is_numeric("-3"));
        assert!(!is_numeric(""));
        assert!(is_signed("-3"));
        assert!(!is_signed("+3"));
        assert!(is_bonus("+3"));
        assert!(is_dice("2d6"));
        assert!(!is_dice("2d"));
        assert!(!is_dice("-1d4"));
        assert!(is_pair("10/3"));
        assert!(!is_pair("10/"));
    }

    const I_RULE: LineKind = LineKind::Fields {
        arity: Arity::Exact(4),
        fields: &[
            FieldCheck { name: "skill number", kind: FieldKind::Numeric },
            FieldCheck { name: "ability value", kind: FieldKind::Numeric },
            FieldCheck { name: "level requirement", kind: FieldKind::Numeric },
        ],
        strip_inline_comment: false,
    };

    #[test]
    fn test_fields_arity_error() {
        let result = run(&I_RULE, 'I', "I:2:3");
        assert_eq!(result.errors, vec!["Line 1: I: line has 3 fields, expected 4: I:2:3"]);
    }

    #[test]
    fn test_fields_reports_each_bad_field() {
        let result = run(&I_RULE, 'I', "I:x:3:y");
        assert_eq!(result.error_count(), 2);
        assert!(result.errors[0].contains("skill number is not numeric: x"));
        assert!(result.errors[1].contains("level requirement is not numeric: y"));
    }

    #[test]
    fn test_fields_ok() {
        assert!(run(&I_RULE, 'I', "I:2:3:1").errors.is_empty());
    }

    #[test]
    fn test_inline_comment_stripped() {
        let rule = LineKind::Fields {
            arity: Arity::Exact(4),
            fields: &[
                FieldCheck { name: "tval", kind: FieldKind::Numeric },
                FieldCheck { name: "sval_min", kind: FieldKind::Numeric },
                FieldCheck { name: "sval_max", kind: FieldKind::Numeric },
            ],
            strip_inline_comment: true,
        };
        let result = run(&rule, 'T', "T:20:1:99 # swords");
        assert!(result.errors.is_empty(), "{:?}", result.errors);
    }

    #[test]
    fn test_pair_list_reports_per_piece() {
        let rule = LineKind::PairList { style: PairStyle::Prerequisite };
        let result = run(&rule, 'P', "P:1/2:bad:3/4");
        assert_eq!(result.errors, vec![
            "Line 1: P: invalid prerequisite 'bad' (expected format: skill/ability)"
        ]);
    }

    #[test]
    fn test_ability_ref_flag_form_warns() {
        let rule = LineKind::PairList { style: PairStyle::AbilityRef };
        let result = run(&rule, 'B', "B:STR | RES_FEAR");
        assert!(result.errors.is_empty());
        assert_eq!(result.warning_count(), 1);
        assert!(result.warnings[0].contains("flag format"));
    }

    #[test]
    fn test_single_pair_limit_check() {
        let mut result = ValidationResult::new();
        let parts: Vec<String> = "B:0/250".split(':').map(str::to_string).collect();
        let ctx = LineContext { colors: None, max_ability_id: Some(239) };
        check_line(&LineKind::SinglePair, 'B', &parts, "B:0/250", 9, &ctx, &mut result);
        assert_eq!(result.errors, vec!["Line 9: B: ability_id 250 exceeds max 239"]);
    }

    #[test]
    fn test_protection_and_damage_patterns() {
        let p_rule = LineKind::Fields {
            arity: Arity::Exact(2),
            fields: &[FieldCheck { name: "protection", kind: FieldKind::ProtectionBracket }],
            strip_inline_comment: false,
        };
        assert!(run(&p_rule, 'P', "P:[+1,1d4]").errors.is_empty());
        assert!(run(&p_rule, 'P', "P:[-2]").errors.is_empty());
        assert!(!run(&p_rule, 'P', "P:[1d4]").errors.is_empty());

        let b_rule = LineKind::Fields {
            arity: Arity::Between(2, 4),
            fields: &[
                FieldCheck { name: "method", kind: FieldKind::Any },
                FieldCheck { name: "effect", kind: FieldKind::Any },
                FieldCheck { name: "damage", kind: FieldKind::DamageParen },
            ],
            strip_inline_comment: false,
        };
        assert!(run(&b_rule, 'B', "B:HIT:WOUND:(+5,2d4)").errors.is_empty());
        assert!(run(&b_rule, 'B', "B:TOUCH:TERRIFY:(+15)").errors.is_empty());
        // Damage is optional: a 3-field line skips the check entirely
        assert!(run(&b_rule, 'B', "B:HIT:WOUND").errors.is_empty());
        assert!(!run(&b_rule, 'B', "B:HIT:WOUND:(5,2d4)").errors.is_empty());
    }

    #[test]
    fn test_flag_list_space_separated() {
        let rule = LineKind::FlagList { known: &["LIGHT", "TRAPS"] };
        let result = run(&rule, 'F', "F:LIGHT TRAPS");
        assert_eq!(result.warning_count(), 0);
        let result = run(&rule, 'F', "F:LIGHT | WEBS");
        assert_eq!(result.warnings, vec!["Line 1: F: unknown flag 'WEBS'"]);
    }

    #[test]
    fn test_range_warn() {
        let rule = LineKind::Fields {
            arity: Arity::Exact(2),
            fields: &[FieldCheck {
                name: "probability",
                kind: FieldKind::NumericRangeWarn { lo: 1, hi: 100 },
            }],
            strip_inline_comment: false,
        };
        assert!(run(&rule, 'N', "N:50").warnings.is_empty());
        let result = run(&rule, 'N', "N:150");
        assert_eq!(result.warnings, vec![
            "Line 1: N: probability 150 is outside expected range 1-100"
        ]);
    }
}
