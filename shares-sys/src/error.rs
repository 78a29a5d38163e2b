// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Error types for system-level operations
#[derive(Error, Debug)]
pub enum SysError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("required tool not found: {0}")]
    ToolNotFound(String),

    /// The validator rejected the composed configuration. The payload is
    /// the tool's output verbatim so the operator sees the real message.
    #[error("configuration check failed: {0}")]
    ConfigRejected(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),
}

/// Result type alias for system operations
pub type Result<T> = std::result::Result<T, SysError>;
