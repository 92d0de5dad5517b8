//! Ceiling resolution from the companion `limits.txt`.
//!
//! Each format's maximum record count is declared as an `M:<code>:<value>`
//! line in `limits.txt`, read from the same directory as the target file.
//! A missing or unparsable limits file disables limit checks rather than
//! failing them.

use std::path::Path;

use crate::schema::{LimitKind, LimitSpec};
use crate::source::try_read_latin1;
use crate::validation::rules::is_numeric;

/// Known limit codes: code, exported name, expected value count.
///
/// Every code takes one value except `A`, which packs four
/// (special:normal:random:self-made artefact counts).
pub const LIMIT_CODES: &[(char, &str, usize)] = &[
    ('F', "feature_types", 1),
    ('K', "object_kinds", 1),
    ('B', "abilities", 1),
    ('A', "artefacts", 4),
    ('E', "special_items", 1),
    ('R', "monster_races", 1),
    ('G', "ghost_templates", 1),
    ('V', "vaults", 1),
    ('P', "player_races", 1),
    ('C', "player_houses", 1),
    ('H', "history_lines", 1),
    ('Q', "quests", 1),
    ('L', "flavors", 1),
    ('O', "objects_on_level", 1),
    ('N', "names_array_size", 1),
    ('T', "descriptions_array_size", 1),
];

/// Sub-field names of the 4-value `M:A` artefact line.
pub const ARTEFACT_FIELDS: &[&str] = &["special", "normal", "random", "selfmade"];

/// Look up a known code's exported name and arity.
pub fn known_code(code: char) -> Option<(&'static str, usize)> {
    LIMIT_CODES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, name, count)| (*name, *count))
}

/// The ceilings relevant to one format, as resolved from `limits.txt`.
#[derive(Debug, Clone)]
pub struct ResolvedLimits {
    /// Maximum record count.
    pub max_count: i64,
    /// Maximum record id, when the format indexes records (count − 1).
    pub max_id: Option<i64>,
    /// Citation used in per-id error messages, e.g. "M:B:240". The
    /// artefact ceiling spans two values so it cites the bare "M:A".
    pub citation: String,
    /// Ability ceiling (`M:B` − 1) for formats that cross-check ability
    /// references.
    pub max_ability_id: Option<i64>,
}

/// Parse `limits.txt` and extract the ceiling for one format.
///
/// For single-value codes the LAST matching declaration wins (a plain
/// overwrite-on-match scan); the artefact pair is taken from the first
/// `M:A` line. Returns `None` when the file is missing or the required
/// declarations cannot be parsed, in which case all limit-dependent
/// checks are skipped.
pub fn resolve(path: &Path, spec: &LimitSpec) -> Option<ResolvedLimits> {
    let text = try_read_latin1(path)?;

    match spec.kind {
        LimitKind::MaxCount | LimitKind::CountOnly => {
            let value = scan_single(&text, spec.code)?;
            Some(ResolvedLimits {
                max_count: value,
                max_id: match spec.kind {
                    LimitKind::CountOnly => None,
                    _ => Some(value - 1),
                },
                citation: format!("M:{}:{}", spec.code, value),
                max_ability_id: None,
            })
        }
        LimitKind::MaxCountWithAbility => {
            let value = scan_single(&text, spec.code)?;
            let abilities = scan_single(&text, 'B')?;
            Some(ResolvedLimits {
                max_count: value,
                max_id: Some(value - 1),
                citation: format!("M:{}:{}", spec.code, value),
                max_ability_id: Some(abilities - 1),
            })
        }
        LimitKind::ArtefactPair => {
            for line in text.lines() {
                let line = line.trim();
                if let Some(rest) = line.strip_prefix("M:A:") {
                    let parts: Vec<&str> = rest.split(':').collect();
                    if parts.len() >= 2 && is_numeric(parts[0]) && is_numeric(parts[1]) {
                        let special: i64 = parts[0].parse().ok()?;
                        let normal: i64 = parts[1].parse().ok()?;
                        let total = special + normal;
                        return Some(ResolvedLimits {
                            max_count: total,
                            max_id: Some(total - 1),
                            citation: "M:A".to_string(),
                            max_ability_id: None,
                        });
                    }
                }
            }
            None
        }
    }
}

/// Last `M:<code>:<digits>` value in the file, if any.
fn scan_single(text: &str, code: char) -> Option<i64> {
    let prefix = format!("M:{}:", code);
    let mut value = None;
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(&prefix) {
            let first = rest.split(':').next().unwrap_or("");
            if is_numeric(first) {
                value = first.parse().ok();
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LimitKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn limits_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    const ABILITY_SPEC: LimitSpec = LimitSpec {
        code: 'B',
        banner: "abilities",
        kind: LimitKind::MaxCount,
    };

    #[test]
    fn test_resolve_single() {
        let f = limits_file("V:1.0\nM:B:240\n");
        let limits = resolve(f.path(), &ABILITY_SPEC).unwrap();
        assert_eq!(limits.max_count, 240);
        assert_eq!(limits.max_id, Some(239));
        assert_eq!(limits.citation, "M:B:240");
    }

    #[test]
    fn test_later_declaration_wins() {
        let f = limits_file("M:B:100\nM:B:240\n");
        let limits = resolve(f.path(), &ABILITY_SPEC).unwrap();
        assert_eq!(limits.max_count, 240);
    }

    #[test]
    fn test_missing_code_unavailable() {
        let f = limits_file("M:F:86\n");
        assert!(resolve(f.path(), &ABILITY_SPEC).is_none());
    }

    #[test]
    fn test_missing_file_unavailable() {
        assert!(resolve(Path::new("/nonexistent/limits.txt"), &ABILITY_SPEC).is_none());
    }

    #[test]
    fn test_artefact_pair_summed() {
        let spec = LimitSpec {
            code: 'A',
            banner: "artefacts",
            kind: LimitKind::ArtefactPair,
        };
        let f = limits_file("M:A:5:10:3:7\n");
        let limits = resolve(f.path(), &spec).unwrap();
        assert_eq!(limits.max_count, 15);
        assert_eq!(limits.max_id, Some(14));
        assert_eq!(limits.citation, "M:A");
    }

    #[test]
    fn test_with_ability_requires_both() {
        let spec = LimitSpec {
            code: 'K',
            banner: "object kinds",
            kind: LimitKind::MaxCountWithAbility,
        };
        let f = limits_file("M:K:600\nM:B:240\n");
        let limits = resolve(f.path(), &spec).unwrap();
        assert_eq!(limits.max_count, 600);
        assert_eq!(limits.max_ability_id, Some(239));

        let f = limits_file("M:K:600\n");
        assert!(resolve(f.path(), &spec).is_none());
    }

    #[test]
    fn test_count_only_has_no_max_id() {
        let spec = LimitSpec {
            code: 'H',
            banner: "history lines",
            kind: LimitKind::CountOnly,
        };
        let f = limits_file("M:H:165\n");
        let limits = resolve(f.path(), &spec).unwrap();
        assert_eq!(limits.max_count, 165);
        assert_eq!(limits.max_id, None);
    }

    #[test]
    fn test_known_code_table() {
        assert_eq!(known_code('A'), Some(("artefacts", 4)));
        assert_eq!(known_code('B'), Some(("abilities", 1)));
        assert_eq!(known_code('Z'), None);
    }
}
