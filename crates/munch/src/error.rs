//! Error types for munch

use thiserror::Error;

/// Result type alias for munch operations
pub type MunchResult<T> = Result<T, MunchError>;

/// Error types for building, executing and decoding statements
#[derive(Debug, Error)]
pub enum MunchError {
    /// Database connection could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement rejected by the Postgres driver
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Statement rejected by a non-Postgres connection
    #[error("Execution error: {0}")]
    Execution(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// One or more rows of a result set failed to decode
    #[error("{} row(s) failed to decode: {}", .0.len(), summarize(.0))]
    RowDecode(Vec<RowDecodeError>),

    /// Statement or configuration is not usable
    #[error("Validation error: {0}")]
    Validation(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// A decode failure for a single row of a result set.
#[derive(Debug, Error)]
#[error("row {row}: {source}")]
pub struct RowDecodeError {
    /// Zero-based index of the row in the result set.
    pub row: usize,
    #[source]
    pub source: Box<MunchError>,
}

impl RowDecodeError {
    pub fn new(row: usize, source: MunchError) -> Self {
        Self {
            row,
            source: Box::new(source),
        }
    }
}

fn summarize(errors: &[RowDecodeError]) -> String {
    match errors {
        [] => String::new(),
        [first] => first.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

impl MunchError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an execution error for connections that are not backed by tokio-postgres
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Check if this is a decode error (single column or aggregated rows)
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::RowDecode(_))
    }

    /// Check if this is a connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Per-row failures carried by a [`MunchError::RowDecode`], empty otherwise.
    pub fn row_failures(&self) -> &[RowDecodeError] {
        match self {
            Self::RowDecode(rows) => rows,
            _ => &[],
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for MunchError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
