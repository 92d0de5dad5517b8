//! The `--validate` action: run the file validator and print a report.
//!
//! The report shape is stable: a banner, the resolved limits, one line
//! per diagnostic (info to stdout, warnings and errors to stderr), a
//! summary block, and a final OK/FAILED verdict.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::formats::Format;
use crate::limits;
use crate::output::{banner, Printer};
use crate::validation::validate_file;

pub fn run(format: Format, file: &Path) -> Result<i32> {
    let schema = format.schema();
    let printer = Printer::new();
    let mut stdout = io::stdout().lock();

    writeln!(stdout, "{}", banner())?;
    writeln!(stdout, "Validating: {}", file.display())?;

    // The companion limits file lives next to the target file
    let resolved = match &schema.limit {
        Some(spec) => {
            let limits_path = file
                .parent()
                .map(|dir| dir.join("limits.txt"))
                .unwrap_or_else(|| PathBuf::from("limits.txt"));
            match limits::resolve(&limits_path, spec) {
                Some(resolved) => {
                    match resolved.max_id {
                        Some(max_id) => writeln!(
                            stdout,
                            "Limits: max {} = {} (max ID = {})",
                            spec.banner, resolved.max_count, max_id
                        )?,
                        None => writeln!(
                            stdout,
                            "Limits: max {} = {}",
                            spec.banner, resolved.max_count
                        )?,
                    }
                    Some(resolved)
                }
                None => {
                    eprintln!(
                        "{} Could not parse limits from {}",
                        printer.severity("WARNING:", false),
                        limits_path.display()
                    );
                    None
                }
            }
        }
        None => None,
    };

    let result = validate_file(schema, file, resolved.as_ref());

    for msg in &result.info {
        writeln!(stdout, "INFO: {}", msg)?;
    }
    for msg in &result.warnings {
        eprintln!("{} {}", printer.severity("WARNING:", false), msg);
    }
    for msg in &result.errors {
        eprintln!("{} {}", printer.severity("ERROR:", true), msg);
    }

    writeln!(stdout, "{}", banner())?;
    writeln!(stdout, "  Errors:   {}", result.error_count())?;
    writeln!(stdout, "  Warnings: {}", result.warning_count())?;
    writeln!(stdout, "{}", banner())?;

    if result.is_valid(schema.validity) {
        writeln!(stdout, "OK")?;
        Ok(0)
    } else {
        writeln!(stdout, "FAILED")?;
        Ok(1)
    }
}
