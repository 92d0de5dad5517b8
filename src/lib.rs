//! edlint - validators and JSON exporters for colon-delimited game data
//! files.
//!
//! The `lib/edit` data files all share one structure: tagged lines where
//! `N:` opens a record and later tags attach fields to it. This crate
//! implements that shared model once (tokenizer, schema-driven line
//! validation, record assembly, limits cross-checking, JSON
//! normalization) and parametrizes it with one schema table per format.

pub mod cli;
pub mod error;
pub mod export;
pub mod formats;
pub mod limits;
pub mod output;
pub mod parser;
pub mod schema;
pub mod source;
pub mod validation;

pub use error::{EdlintError, Result};
pub use formats::Format;
pub use limits::ResolvedLimits;
pub use parser::{assemble, RecordSink};
pub use schema::Schema;
pub use validation::{validate_file, validate_source, ValidationResult};
