use thiserror::Error;

/// Errors returned by chunk store operations.
///
/// A chunk that exists but has expired is reported as [`StoreError::NotFound`],
/// exactly like an identifier that was never assigned.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No visible chunk matches the requested identifier.
    #[error("no matching chunk found")]
    NotFound,

    /// The caller supplied input the store refuses to persist.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store failed (connection, constraint, timeout, decoding).
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl StoreError {
    /// Returns `true` for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
