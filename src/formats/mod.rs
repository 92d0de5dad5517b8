//! The thirteen file formats.
//!
//! Each module holds one format's schema table, its record type(s), the
//! [`RecordSink`] that folds lines into records, and its JSON exporter.
//! All actual parsing and validation mechanics live in the shared engine;
//! the modules here are configuration plus the per-format record shapes.

pub mod ability;
pub mod artefact;
pub mod flavor;
pub mod history;
pub mod house;
pub mod limits_file;
pub mod monster;
pub mod names;
pub mod object;
pub mod race;
pub mod special;
pub mod terrain;
pub mod vault;

use std::path::Path;

use serde_json::Value;

use crate::parser::{assemble, RecordSink};
use crate::schema::Schema;
use crate::source::try_read_latin1;

/// All supported formats, one per CLI subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ability,
    Artefact,
    Flavor,
    History,
    House,
    Limits,
    Monster,
    Names,
    Object,
    Race,
    Special,
    Terrain,
    Vault,
}

impl Format {
    pub fn schema(&self) -> &'static Schema {
        match self {
            Format::Ability => &ability::SCHEMA,
            Format::Artefact => &artefact::SCHEMA,
            Format::Flavor => &flavor::SCHEMA,
            Format::History => &history::SCHEMA,
            Format::House => &house::SCHEMA,
            Format::Limits => &limits_file::SCHEMA,
            Format::Monster => &monster::SCHEMA,
            Format::Names => &names::SCHEMA,
            Format::Object => &object::SCHEMA,
            Format::Race => &race::SCHEMA,
            Format::Special => &special::SCHEMA,
            Format::Terrain => &terrain::SCHEMA,
            Format::Vault => &vault::SCHEMA,
        }
    }

    /// Parse a file and build its export document. Returns the record
    /// count alongside so the CLI can treat zero records as a failure.
    pub fn export_file(&self, path: &Path) -> (usize, Value) {
        match self {
            Format::Ability => {
                let records = ability::load(path);
                (records.len(), ability::export(records))
            }
            Format::Artefact => {
                let records = artefact::load(path);
                (records.len(), artefact::export(records))
            }
            Format::Flavor => {
                let records = flavor::load(path);
                (records.len(), flavor::export(records))
            }
            Format::History => {
                let records = history::load(path);
                (records.len(), history::export(records))
            }
            Format::House => {
                let records = house::load(path);
                (records.len(), house::export(records))
            }
            Format::Limits => {
                let records = limits_file::load(path);
                (records.len(), limits_file::export(records))
            }
            Format::Monster => {
                let records = monster::load(path);
                (records.len(), monster::export(records))
            }
            Format::Names => {
                let records = names::load(path);
                (records.len(), names::export(records))
            }
            Format::Object => {
                let records = object::load(path);
                (records.len(), object::export(records))
            }
            Format::Race => {
                let records = race::load(path);
                (records.len(), race::export(records))
            }
            Format::Special => {
                let records = special::load(path);
                (records.len(), special::export(records))
            }
            Format::Terrain => {
                let records = terrain::load(path);
                (records.len(), terrain::export(records))
            }
            Format::Vault => {
                let records = vault::load(path);
                (records.len(), vault::export(records))
            }
        }
    }
}

/// Read a file as Latin-1 and assemble its records; a missing file yields
/// no records.
pub(crate) fn load_records<S: RecordSink>(
    schema: &Schema,
    path: &Path,
    sink: &S,
) -> Vec<S::Record> {
    match try_read_latin1(path) {
        Some(text) => assemble(schema, &text, sink),
        None => Vec::new(),
    }
}

/// Append a description line: the first line sets the field, later lines
/// concatenate with a single separating space.
pub(crate) fn push_description(slot: &mut Option<String>, content: &str) {
    match slot {
        None => *slot = Some(content.to_string()),
        Some(text) => {
            text.push(' ');
            text.push_str(content);
        }
    }
}

/// Parse helper: digits-only field to integer.
pub(crate) fn numeric_field(value: &str) -> Option<i64> {
    if crate::validation::rules::is_numeric(value) {
        value.parse().ok()
    } else {
        None
    }
}

/// Parse helper: integer with optional leading `-`.
pub(crate) fn signed_field(value: &str) -> Option<i64> {
    if crate::validation::rules::is_signed(value) {
        value.parse().ok()
    } else {
        None
    }
}

/// Parse helper: split a pipe-delimited flag list.
pub(crate) fn split_flags(content: &str) -> Vec<String> {
    content
        .split('|')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_description_concatenates_with_space() {
        let mut slot = None;
        push_description(&mut slot, "First.");
        push_description(&mut slot, "Second.");
        assert_eq!(slot.as_deref(), Some("First. Second."));
    }

    #[test]
    fn test_numeric_field() {
        assert_eq!(numeric_field("42"), Some(42));
        assert_eq!(numeric_field("-1"), None);
        assert_eq!(numeric_field("x"), None);
    }

    #[test]
    fn test_signed_field() {
        assert_eq!(signed_field("-3"), Some(-3));
        assert_eq!(signed_field("+3"), None);
    }

    #[test]
    fn test_split_flags() {
        assert_eq!(
            split_flags("STR | RES_FEAR |"),
            vec!["STR".to_string(), "RES_FEAR".to_string()]
        );
    }
}
