//! Core error type.
//!
//! Sub-crates define their own error enums; `CoreError` only covers failures
//! that originate in this crate (parsing enum labels from text).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown {what} {value:?}")]
    UnknownLabel { what: &'static str, value: String },
}

/// Shorthand result type for `ems-core`.
pub type CoreResult<T> = Result<T, CoreError>;
