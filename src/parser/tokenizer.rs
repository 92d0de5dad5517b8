//! Line tokenization.
//!
//! Every data line is a tag character, a colon, and colon-delimited
//! fields. Splitting is deliberately naive (embedded colons are not
//! respected) with a single documented exception: terrain encodes a
//! literal `:` symbol as `G::`, which must be recognized before the
//! generic split or the field boundaries come out wrong. Consumers that
//! need a trailing free-text field re-join the tail fields with `:`.

use crate::schema::Schema;

/// Classification of one raw line against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Blank line or `#` comment.
    Skip,
    /// `V:` version stamp.
    Version,
    /// A recognized tagged line, naively split on `:` (tag included as
    /// the first part).
    Tagged { tag: char, parts: Vec<String> },
    /// A valid `G::` colon-symbol escape; the symbol is `:` and this is
    /// the colour after it.
    ColonEscape { color: String },
    /// A `G::` prefix not followed by the required third colon.
    BadColonEscape,
    /// `<char>:` where the tag is not in the schema.
    UnknownTag(char),
    /// No `:` in the second position and not a comment.
    Untagged,
}

/// Classify a line. `line` should already be trimmed.
pub fn tokenize(line: &str, schema: &Schema) -> Token {
    if line.is_empty() || line.starts_with('#') {
        return Token::Skip;
    }
    if line.starts_with("V:") {
        return Token::Version;
    }

    if schema.colon_symbol_escape && line.starts_with("G::") {
        // G:::color means symbol ':'; anything else after G:: is broken
        if let Some(color) = line.strip_prefix("G:::") {
            return Token::ColonEscape {
                color: color.to_string(),
            };
        }
        return Token::BadColonEscape;
    }

    let mut chars = line.chars();
    let first = chars.next();
    let second = chars.next();
    match (first, second) {
        (Some(tag), Some(':')) if schema.knows(tag) => Token::Tagged {
            tag,
            parts: split_fields(line),
        },
        (Some(tag), Some(':')) => Token::UnknownTag(tag),
        _ => Token::Untagged,
    }
}

/// Naive colon split of a whole line, tag included.
pub fn split_fields(line: &str) -> Vec<String> {
    line.split(':').map(str::to_string).collect()
}

/// Split for the record assembler, applying the colon-symbol escape when
/// the schema uses it. A valid escape yields `["G", ":", color]` so the
/// generic field positions still line up.
pub fn split_record_fields(line: &str, schema: &Schema) -> Vec<String> {
    if schema.colon_symbol_escape && line.starts_with("G::") {
        if let Some(color) = line.strip_prefix("G:::") {
            return vec!["G".to_string(), ":".to_string(), color.to_string()];
        }
    }
    split_fields(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{ability, terrain};

    #[test]
    fn test_skip_blank_and_comments() {
        assert_eq!(tokenize("", &ability::SCHEMA), Token::Skip);
        assert_eq!(tokenize("# header", &ability::SCHEMA), Token::Skip);
    }

    #[test]
    fn test_version_stamp() {
        assert_eq!(tokenize("V:1.0", &ability::SCHEMA), Token::Version);
    }

    #[test]
    fn test_tagged_line() {
        match tokenize("N:0:Test", &ability::SCHEMA) {
            Token::Tagged { tag, parts } => {
                assert_eq!(tag, 'N');
                assert_eq!(parts, vec!["N", "0", "Test"]);
            }
            other => panic!("expected Tagged, got {:?}", other),
        }
    }

    #[test]
    fn test_name_with_colon_splits_naively() {
        match tokenize("N:3:Sting: Elf-blade", &ability::SCHEMA) {
            Token::Tagged { parts, .. } => {
                assert_eq!(parts.len(), 4);
            }
            other => panic!("expected Tagged, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(tokenize("Z:1:2", &ability::SCHEMA), Token::UnknownTag('Z'));
    }

    #[test]
    fn test_untagged_line() {
        assert_eq!(tokenize("hello world", &ability::SCHEMA), Token::Untagged);
    }

    #[test]
    fn test_terrain_colon_escape() {
        assert_eq!(
            tokenize("G:::s", &terrain::SCHEMA),
            Token::ColonEscape {
                color: "s".to_string()
            }
        );
    }

    #[test]
    fn test_terrain_bad_colon_escape() {
        assert_eq!(tokenize("G::x", &terrain::SCHEMA), Token::BadColonEscape);
    }

    #[test]
    fn test_escape_only_applies_to_terrain() {
        // An ability-format G:: line is just an unknown tag split
        match tokenize("G:::s", &ability::SCHEMA) {
            Token::UnknownTag('G') => {}
            other => panic!("expected UnknownTag, got {:?}", other),
        }
    }

    #[test]
    fn test_split_record_fields_escape() {
        assert_eq!(
            split_record_fields("G:::s", &terrain::SCHEMA),
            vec!["G", ":", "s"]
        );
        // Broken escape falls back to the naive split
        assert_eq!(
            split_record_fields("G::x", &terrain::SCHEMA),
            vec!["G", "", "x"]
        );
    }
}
