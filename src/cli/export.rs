//! The `--export-json` action: parse the file and print one JSON
//! document to stdout.

use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::export::to_pretty;
use crate::formats::Format;

pub fn run(format: Format, file: &Path) -> Result<i32> {
    let schema = format.schema();
    let (count, value) = format.export_file(file);

    // A missing file and an empty file look the same here: no records
    if count == 0 {
        eprintln!("ERROR: No {} found in {}", schema.plural, file.display());
        return Ok(1);
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", to_pretty(&value))?;
    Ok(0)
}
