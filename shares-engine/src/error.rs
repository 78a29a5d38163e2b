// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use shares_sys::SysError;

/// A single rejected input field, kept separate so callers can surface
/// violations next to the field instead of as one blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// One or more input fields failed validation. Nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError {
            violations: vec![FieldViolation {
                field,
                message: message.into(),
            }],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: ")?;
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", violation.field, violation.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Engine-level errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("a share named '{0}' already exists")]
    DuplicateName(String),

    #[error("no share with id {0}")]
    NotFound(Uuid),

    /// The target record file exists but was not written by this manager.
    /// It is never overwritten or removed.
    #[error("refusing to overwrite {0}: not a managed share record")]
    ForeignFile(PathBuf),

    #[error("I/O error: {0}")]
    Io(String),

    /// The composed configuration failed validation; the previously
    /// active configuration is still fully in effect. The payload is the
    /// validator's message verbatim.
    #[error("configuration rejected: {0}")]
    ConfigRejected(String),

    #[error(transparent)]
    Sys(SysError),
}

impl EngineError {
    pub fn io(context: impl fmt::Display, source: impl fmt::Display) -> Self {
        EngineError::Io(format!("{context}: {source}"))
    }
}

impl From<SysError> for EngineError {
    fn from(err: SysError) -> Self {
        match err {
            SysError::ConfigRejected(message) => EngineError::ConfigRejected(message),
            other => EngineError::Sys(other),
        }
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
