//! Error types for ems-audit.

use thiserror::Error;

/// Errors that can occur when appending to an audit sink.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("audit sink already finished")]
    Finished,
}

/// Alias for `Result<T, AuditError>`.
pub type AuditResult<T> = Result<T, AuditError>;
