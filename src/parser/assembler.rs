//! Record assembly.
//!
//! Folds tokenized lines into records: a starter line finalizes the
//! record under construction and opens a new one, every other recognized
//! tag mutates the open record, and the last record is flushed at end of
//! input. The assembler is tolerant: it never errors. Lines
//! before the first starter are ignored, unknown tags are ignored, and
//! fields that fail local conversion are simply absent from the output;
//! strictness is the validator's job.

use serde::Serialize;

use crate::schema::Schema;

use super::tokenizer::split_record_fields;

/// Per-format record construction, plugged into [`assemble`].
pub trait RecordSink {
    type Record: Serialize;

    /// Build a new record from a starter line. `None` skips the record
    /// (malformed starters produce no output).
    fn start(&self, parts: &[String], line: &str) -> Option<Self::Record>;

    /// Fold one attribute line into the open record. `parts` is the
    /// naive colon split of the trimmed line, `line` the trimmed line,
    /// and `raw` the original line with whitespace intact (layout rows
    /// need it).
    fn attr(&self, record: &mut Self::Record, tag: char, parts: &[String], line: &str, raw: &str);
}

/// Run a sink over source text, returning the finished records.
pub fn assemble<S: RecordSink>(schema: &Schema, source: &str, sink: &S) -> Vec<S::Record> {
    let mut records = Vec::new();
    let mut current: Option<S::Record> = None;

    for raw in source.lines() {
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with("V:") {
            continue;
        }

        let mut chars = line.chars();
        let tag = chars.next();
        let colon = chars.next();
        if colon != Some(':') {
            continue;
        }
        let Some(tag) = tag else { continue };

        if tag == schema.starter {
            // Flush on boundary; the final flush happens after the loop
            if let Some(record) = current.take() {
                records.push(record);
            }
            let parts = split_record_fields(line, schema);
            current = sink.start(&parts, line);
            continue;
        }

        if let Some(record) = current.as_mut() {
            let parts = split_record_fields(line, schema);
            sink.attr(record, tag, &parts, line, raw);
        }
    }

    if let Some(record) = current.take() {
        records.push(record);
    }

    records
}
