use miette::Diagnostic;
use thiserror::Error;

/// Main error type for edlint operations
#[derive(Error, Diagnostic, Debug)]
pub enum EdlintError {
    #[error("IO error: {0}")]
    #[diagnostic(code(edlint::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(edlint::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(edlint::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl EdlintError {
    /// True when the underlying cause is a closed output pipe.
    ///
    /// Writing JSON into `head` or a pager that exits early raises EPIPE;
    /// the process must exit 0 in that case rather than report a failure.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(
            self,
            EdlintError::IoError(e) if e.kind() == std::io::ErrorKind::BrokenPipe
        )
    }
}

pub type Result<T> = std::result::Result<T, EdlintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_pipe_detection() {
        let err = EdlintError::IoError(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(err.is_broken_pipe());

        let err = EdlintError::IoError(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(!err.is_broken_pipe());
    }
}
