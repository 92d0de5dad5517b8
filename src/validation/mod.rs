//! File validation.
//!
//! Runs the tokenizer and per-tag rules over a whole file, tracking the
//! cross-line state (version stamp, ids seen, ordering, limits) and
//! collecting diagnostics. Validation never aborts: every line is checked
//! whether or not a record is open, and the caller reads validity off the
//! returned [`ValidationResult`].

pub mod diagnostics;
pub mod rules;

pub use diagnostics::ValidationResult;

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::limits::{known_code, ResolvedLimits, LIMIT_CODES};
use crate::parser::tokenizer::{tokenize, Token};
use crate::schema::{colors, Identity, IdOrdering, Schema, SeqCheck};
use crate::source::try_read_latin1;
use rules::{check_line, is_numeric, LineContext};

static SPELL_PCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"SPELL_PCT_\d+").unwrap());

/// Validate the file at `path`. A missing file is reported as an ordinary
/// validation error, not an I/O failure.
pub fn validate_file(
    schema: &Schema,
    path: &Path,
    limits: Option<&ResolvedLimits>,
) -> ValidationResult {
    match try_read_latin1(path) {
        Some(text) => validate_source(schema, &text, limits),
        None => {
            let mut result = ValidationResult::new();
            result.error(format!(
                "{} file not found: {}",
                schema.label,
                path.display()
            ));
            result
        }
    }
}

/// Validate in-memory source text against a schema.
pub fn validate_source(
    schema: &Schema,
    source: &str,
    limits: Option<&ResolvedLimits>,
) -> ValidationResult {
    let mut result = ValidationResult::new();
    let ctx = LineContext {
        colors: schema.colors.as_ref(),
        max_ability_id: limits.and_then(|l| l.max_ability_id),
    };

    // Cross-line state
    let mut has_version = false;
    let mut ids_seen: HashMap<i64, usize> = HashMap::new();
    let mut prev_id: i64 = -1;
    let mut names_seen: HashMap<String, usize> = HashMap::new();
    let mut prev_name: Option<String> = None;
    let mut codes_seen: HashMap<String, usize> = HashMap::new();
    let mut entry_count: usize = 0;

    // Monster spell sequencing
    let check_first_spell = schema.has_seq_check(SeqCheck::FirstSpellLinePct);
    let mut in_record = false;
    let mut first_spell_pending = false;

    // Vault layout sequencing
    let check_layout = schema.has_seq_check(SeqCheck::LayoutWidths);
    let mut layout_id: Option<i64> = None;
    let mut layout_name = String::new();
    let mut layout_rows: Vec<String> = Vec::new();

    for (lineno, raw) in source.lines().enumerate() {
        let lineno = lineno + 1;
        let stripped = raw.trim();

        match tokenize(stripped, schema) {
            Token::Skip => {}
            Token::Version => has_version = true,

            Token::Tagged { tag, parts } if tag == schema.starter => {
                if check_layout {
                    if let Some(id) = layout_id {
                        check_layout_widths(id, &layout_name, &layout_rows, &mut result);
                    }
                }

                match schema.identity {
                    Identity::NumericId { ordering } => {
                        if let Some(id) = checked_record_id(
                            schema, &parts, stripped, lineno, &ctx, &mut result,
                        ) {
                            if let Some(&first) = ids_seen.get(&id) {
                                result.error(format!(
                                    "Line {}: Duplicate ID {} (first seen at line {})",
                                    lineno, id, first
                                ));
                            } else {
                                ids_seen.insert(id, lineno);
                            }

                            check_ordering(ordering, id, prev_id, lineno, &mut result);
                            prev_id = id;

                            if let Some(l) = limits {
                                if let Some(max_id) = l.max_id {
                                    if id > max_id {
                                        result.error(format!(
                                            "Line {}: {} ID {} exceeds maximum allowed ID {} (from limits.txt {})",
                                            lineno, schema.label, id, max_id, l.citation
                                        ));
                                    }
                                }
                            }

                            if check_layout {
                                layout_id = Some(id);
                                layout_name = if parts.len() >= 3 {
                                    parts[2..].join(":")
                                } else {
                                    String::new()
                                };
                                layout_rows.clear();
                            }
                        }
                    }

                    Identity::Name => {
                        if let Some(name) = checked_record_name(stripped, lineno, &mut result) {
                            if let Some(&first) = names_seen.get(&name) {
                                result.error(format!(
                                    "Line {}: Duplicate name '{}' (first seen at line {})",
                                    lineno, name, first
                                ));
                            } else {
                                names_seen.insert(name.clone(), lineno);
                            }
                            if let Some(prev) = &prev_name {
                                if name < *prev {
                                    result.warning(format!(
                                        "Line {}: Name '{}' is not in alphabetical order (comes after '{}')",
                                        lineno, name, prev
                                    ));
                                }
                            }
                            prev_name = Some(name);
                        }
                    }

                    Identity::EntryCount => {
                        let before = result.error_count();
                        check_line(
                            &schema.starter_rule,
                            schema.starter,
                            &parts,
                            stripped,
                            lineno,
                            &ctx,
                            &mut result,
                        );
                        if result.error_count() == before {
                            entry_count += 1;
                        }
                    }

                    Identity::LimitCodes => {
                        if let Some(code) =
                            checked_limit_decl(&parts, stripped, lineno, &mut result)
                        {
                            if let Some(&first) = codes_seen.get(&code) {
                                result.error(format!(
                                    "Line {}: Duplicate limit code '{}' (first seen at line {})",
                                    lineno, code, first
                                ));
                            } else {
                                codes_seen.insert(code, lineno);
                            }
                        }
                    }
                }

                if check_first_spell {
                    in_record = true;
                    first_spell_pending = true;
                }
            }

            Token::Tagged { tag, parts } => {
                if check_layout && tag == 'D' {
                    layout_rows.push(layout_row(raw, stripped));
                    continue;
                }

                if check_first_spell && tag == 'S' {
                    if in_record && first_spell_pending {
                        if !SPELL_PCT.is_match(stripped) {
                            result.error(format!(
                                "Line {}: First S: line must contain SPELL_PCT_X: {}",
                                lineno, stripped
                            ));
                        }
                        first_spell_pending = false;
                    }
                    continue;
                }

                // Tokenized as Tagged, so the rule exists
                if let Some(rule) = schema.rule_for(tag) {
                    check_line(rule, tag, &parts, stripped, lineno, &ctx, &mut result);
                }
            }

            Token::ColonEscape { color } => {
                let (extended, unknown_is_error) = match &schema.colors {
                    Some(p) => (p.extended, p.unknown_is_error),
                    None => (&[][..], true),
                };
                if !colors::is_valid(&color, extended) {
                    if unknown_is_error {
                        result.error(format!(
                            "Line {}: G: unrecognized color '{}'",
                            lineno, color
                        ));
                    } else {
                        result.warning(format!(
                            "Line {}: G: color '{}' not in documented color list",
                            lineno, color
                        ));
                    }
                }
            }

            Token::BadColonEscape => {
                result.error(format!(
                    "Line {}: G: malformed line with colon symbol: {}",
                    lineno, stripped
                ));
            }

            Token::UnknownTag(tag) => {
                result.error(format!(
                    "Line {}: Unknown line type '{}:' in line '{}'",
                    lineno, tag, stripped
                ));
            }

            Token::Untagged => {
                result.error(format!(
                    "Line {}: Unrecognized line (missing '#' comment marker?): '{}'",
                    lineno, stripped
                ));
            }
        }
    }

    if check_layout {
        if let Some(id) = layout_id {
            check_layout_widths(id, &layout_name, &layout_rows, &mut result);
        }
    }

    if !has_version {
        result.error("Missing required version stamp (V: line)");
    }

    match schema.identity {
        Identity::NumericId { .. } => {
            if let (Some(l), Some(spec)) = (limits, &schema.limit) {
                let count = ids_seen.len();
                if count as i64 > l.max_count {
                    result.error(format!(
                        "Total {} count ({}) exceeds maximum allowed ({}) from limits.txt M:{}",
                        schema.count_label, count, l.max_count, spec.code
                    ));
                }
            }
        }
        Identity::EntryCount => {
            if let (Some(l), Some(spec)) = (limits, &schema.limit) {
                if entry_count as i64 > l.max_count {
                    result.error(format!(
                        "Total {} count ({}) exceeds maximum allowed ({}) from limits.txt M:{}",
                        schema.count_label, entry_count, l.max_count, spec.code
                    ));
                }
            }
        }
        Identity::LimitCodes => {
            for (code, _, _) in LIMIT_CODES {
                if !codes_seen.contains_key(&code.to_string()) {
                    result.warning(format!("Missing expected limit code 'M:{}'", code));
                }
            }
        }
        Identity::Name => {}
    }

    result
}

/// Validate a record-starter line and extract its numeric id. The id is
/// only taken when the line produced no errors, so a malformed starter
/// never feeds the duplicate/ordering state.
fn checked_record_id(
    schema: &Schema,
    parts: &[String],
    line: &str,
    lineno: usize,
    ctx: &LineContext,
    result: &mut ValidationResult,
) -> Option<i64> {
    let before = result.error_count();
    check_line(
        &schema.starter_rule,
        schema.starter,
        parts,
        line,
        lineno,
        ctx,
        result,
    );
    if result.error_count() != before {
        return None;
    }
    parts
        .get(1)
        .filter(|s| is_numeric(s))
        .and_then(|s| s.parse().ok())
}

/// Extract the record name from a names-format starter (split on the
/// first colon only, so names may contain colons).
fn checked_record_name(
    line: &str,
    lineno: usize,
    result: &mut ValidationResult,
) -> Option<String> {
    let Some((_, rest)) = line.split_once(':') else {
        result.error(format!("Line {}: N: line missing name: {}", lineno, line));
        return None;
    };
    let name = rest.trim();
    if name.is_empty() {
        result.error(format!("Line {}: N: line has empty name: {}", lineno, line));
        return None;
    }
    Some(name.to_string())
}

/// Validate an `M:` limit declaration against the known-code table and
/// return its code when usable.
fn checked_limit_decl(
    parts: &[String],
    line: &str,
    lineno: usize,
    result: &mut ValidationResult,
) -> Option<String> {
    if parts.len() < 3 {
        result.error(format!(
            "Line {}: M: line has {} fields, expected at least 3: {}",
            lineno,
            parts.len(),
            line
        ));
        return None;
    }

    let code = parts[1].clone();
    let expected = match code
        .chars()
        .next()
        .filter(|_| code.chars().count() == 1)
        .and_then(known_code)
    {
        Some((_, count)) => count,
        None => {
            result.warning(format!(
                "Line {}: M: unknown limit code '{}': {}",
                lineno, code, line
            ));
            // Still parse it with whatever arity it has
            parts.len() - 2
        }
    };

    let actual = parts.len() - 2;
    if actual != expected {
        result.error(format!(
            "Line {}: M:{}: has {} values, expected {}: {}",
            lineno, code, actual, expected, line
        ));
        return None;
    }

    for (i, value) in parts[2..].iter().enumerate() {
        if !is_numeric(value) {
            result.error(format!(
                "Line {}: M:{}: value {} is not numeric: {}",
                lineno,
                code,
                i + 1,
                value
            ));
            return None;
        }
    }

    Some(code)
}

fn check_ordering(
    ordering: IdOrdering,
    id: i64,
    prev_id: i64,
    lineno: usize,
    result: &mut ValidationResult,
) {
    match ordering {
        IdOrdering::Strict => {
            if id <= prev_id {
                result.error(format!(
                    "Line {}: ID {} is not greater than previous ID {} (IDs must be strictly increasing)",
                    lineno, id, prev_id
                ));
            }
        }
        IdOrdering::AdvisoryDecrease => {
            if id < prev_id {
                result.warning(format!(
                    "Line {}: ID {} is less than previous ID {} (IDs should generally increase)",
                    lineno, id, prev_id
                ));
            }
        }
        IdOrdering::AdvisoryNonIncrease => {
            if id <= prev_id {
                result.warning(format!(
                    "Line {}: ID {} is not greater than previous ID {}",
                    lineno, id, prev_id
                ));
            }
        }
    }
}

/// Everything after `D:` in the original, untrimmed line; vault layout
/// rows keep their whitespace exactly.
fn layout_row(raw: &str, stripped: &str) -> String {
    if let Some(rest) = raw.strip_prefix("D:") {
        rest.to_string()
    } else if let Some(idx) = raw.find("D:") {
        raw[idx + 2..].to_string()
    } else {
        stripped.get(2..).unwrap_or("").to_string()
    }
}

fn check_layout_widths(id: i64, name: &str, rows: &[String], result: &mut ValidationResult) {
    if rows.is_empty() {
        return;
    }
    let widths: Vec<usize> = rows.iter().map(|r| r.chars().count()).collect();
    let min = *widths.iter().min().unwrap();
    let max = *widths.iter().max().unwrap();
    if min != max {
        result.error(format!(
            "Vault {} ({}): layout has inconsistent line widths (min={}, max={})",
            id, name, min, max
        ));
    }
}
