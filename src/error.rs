//! Error types for the row binding layer

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A select produced zero rows. Carries the executed SQL text.
    ///
    /// Reads treat an empty result set as an error rather than an empty
    /// collection; callers wanting optional lookups must catch this.
    #[error("query returned empty result set: {0}")]
    EmptyResultSet(String),

    /// The asserting accessor was called on a column with no non-null value.
    #[error("missing or null value for column: {0}")]
    MissingOrNullValue(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Underlying driver failure (constraint violation, malformed SQL, I/O).
    /// Propagated to the caller unchanged, never retried.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
