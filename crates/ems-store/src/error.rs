use thiserror::Error;

/// Errors reported by a record store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A save targeted a record the store has never seen.
    #[error("no {entity} with id {id} in the store")]
    Missing { entity: &'static str, id: u64 },

    /// Adapter-specific failure (connection lost, constraint violated, …).
    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
