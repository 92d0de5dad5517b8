//! Diagnostic accumulation for file validation.

use crate::schema::Validity;

/// Collected diagnostics from a validation pass.
///
/// Validation never fails early: every problem in the file is recorded
/// here and the caller decides validity at the end. Messages keep the
/// order in which they were found.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Record a warning.
    pub fn warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Record an informational message.
    pub fn log_info(&mut self, msg: impl Into<String>) {
        self.info.push(msg.into());
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Whether the file passes under the given validity policy.
    ///
    /// Most formats block on warnings too; monster and object data treat
    /// warnings as advisory.
    pub fn is_valid(&self, validity: Validity) -> bool {
        match validity {
            Validity::ErrorsOnly => self.errors.is_empty(),
            Validity::ErrorsAndWarnings => self.errors.is_empty() && self.warnings.is_empty(),
        }
    }
}
