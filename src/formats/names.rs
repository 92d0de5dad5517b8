//! The names format: a flat list of `N: name` lines kept in
//! alphabetical order.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::parser::RecordSink;
use crate::schema::{Identity, LineKind, Schema, Validity};

use super::load_records;

pub static SCHEMA: Schema = Schema {
    name: "names",
    label: "Names",
    plural: "names",
    count_label: "name",
    file_name: "names.txt",
    starter: 'N',
    starter_rule: LineKind::FreeText,
    tags: &[],
    identity: Identity::Name,
    validity: Validity::ErrorsAndWarnings,
    limit: None,
    colors: None,
    colon_symbol_escape: false,
    seq_checks: &[],
};

/// A name record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Name {
    pub name: String,
}

pub struct Sink;

impl RecordSink for Sink {
    type Record = Name;

    fn start(&self, _parts: &[String], line: &str) -> Option<Name> {
        // Split on the first colon only; names may contain colons
        let (_, rest) = line.split_once(':')?;
        let name = rest.trim();
        if name.is_empty() {
            return None;
        }
        Some(Name {
            name: name.to_string(),
        })
    }

    fn attr(&self, _record: &mut Name, _tag: char, _parts: &[String], _line: &str, _raw: &str) {}
}

pub fn load(path: &Path) -> Vec<Name> {
    load_records(&SCHEMA, path, &Sink)
}

/// Export the names themselves, sorted alphabetically.
pub fn export(records: Vec<Name>) -> Value {
    let mut names: Vec<String> = records.into_iter().map(|n| n.name).collect();
    names.sort();

    let mut root = Map::new();
    root.insert(
        "names".to_string(),
        Value::Array(names.into_iter().map(Value::from).collect()),
    );
    Value::Object(root)
}
