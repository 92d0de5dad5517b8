//! Data file reading.
//!
//! The edit files are legacy Latin-1 text and may contain bytes that are
//! not valid UTF-8, so they cannot go through `fs::read_to_string`.

use std::fs;
use std::io;
use std::path::Path;

/// Read a file as Latin-1 text.
///
/// Every byte maps to the Unicode code point of the same value, so the
/// decode cannot fail.
pub fn read_latin1(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Read a file as Latin-1 text, returning `None` when it does not exist
/// or cannot be read.
pub fn try_read_latin1(path: &Path) -> Option<String> {
    read_latin1(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_latin1_ascii() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"N:0:Test\n").unwrap();
        assert_eq!(read_latin1(f.path()).unwrap(), "N:0:Test\n");
    }

    #[test]
    fn test_read_latin1_high_bytes() {
        let mut f = NamedTempFile::new().unwrap();
        // 0xE9 is 'é' in Latin-1 and invalid on its own in UTF-8
        f.write_all(b"N:0:F\xe9anor\n").unwrap();
        assert_eq!(read_latin1(f.path()).unwrap(), "N:0:F\u{e9}anor\n");
    }

    #[test]
    fn test_try_read_missing_file() {
        assert!(try_read_latin1(Path::new("/nonexistent/file.txt")).is_none());
    }
}
