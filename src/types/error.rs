use thiserror::Error;

/// driver-logbook error types
#[derive(Error, Debug)]
pub enum LogbookError {
    /// Malformed input: bad clock time, unknown export schema, invalid period or report
    #[error("validation error: {0}")]
    Validation(String),

    /// Failed to parse a stored JSON file
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Report store operation failed
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// CSV/PDF rendering failed; no partial artifact is produced
    #[error("export failed: {0}")]
    Export(String),
}

impl LogbookError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for driver-logbook
pub type Result<T> = std::result::Result<T, LogbookError>;
