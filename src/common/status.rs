use thiserror::Error;

/// Result type used across the read path.
pub type Result<T, E = StorageError> = std::result::Result<T, E>;

/// Errors surfaced by column readers, iterators and expressions.
///
/// Every read primitive is a straight sequence of sub-operations; the first
/// failing one returns its error unchanged, so callers see exactly what the
/// lowest layer reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("end of file: {0}")]
    EndOfFile(String),

    /// Stored data does not match what the reader declares.
    #[error("corruption: {0}")]
    Corruption(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    /// A value could not be represented in the requested type.
    #[error("cast failed: {0}")]
    CastFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl StorageError {
    pub fn err<T>(self) -> Result<T> {
        Err(self)
    }
}
