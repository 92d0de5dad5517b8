//! Terminal output helpers for the edlint CLI.
//!
//! Diagnostic prefixes are coloured when the stream is a terminal and left
//! plain when piped, so scripted consumers always see the bare
//! `ERROR:`/`WARNING:` text.

use std::io::{self, IsTerminal};

/// ANSI escape codes.
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";

/// Width of the `=` separator used around validation reports.
pub const BANNER_WIDTH: usize = 60;

/// Terminal-aware prefix formatter.
pub struct Printer {
    color: bool,
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// Format a diagnostic severity label with colour.
    pub fn severity(&self, label: &str, is_error: bool) -> String {
        let color = if is_error { RED } else { YELLOW };
        if self.color {
            format!("{BOLD}{color}{label}{RESET}")
        } else {
            label.to_string()
        }
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

/// The `============` separator line.
pub fn banner() -> String {
    "=".repeat(BANNER_WIDTH)
}

/// Pluralize a count: `plural(1, "record", "records")` → "1 record".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, pluralized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_width() {
        assert_eq!(banner().len(), 60);
        assert!(banner().chars().all(|c| c == '='));
    }

    #[test]
    fn test_plural_singular() {
        assert_eq!(plural(1, "record", "records"), "1 record");
    }

    #[test]
    fn test_plural_many() {
        assert_eq!(plural(5, "record", "records"), "5 records");
    }
}
