//! Error types for pgtyped

use thiserror::Error;

/// Result type alias for pgtyped operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Errors returned to the caller.
///
/// Driver failures are carried untouched in [`OrmError::Query`]; the crate never
/// retries or interprets SQLSTATE codes. Misuse that indicates a defect in the
/// generated schema or in calling code (for example binding a scalar where a list
/// is expected) panics instead of surfacing here.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required field list was empty (conflict target, update set, copy columns).
    #[error("fields is empty: {0}")]
    EmptyFields(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// A typed column handle does not match its descriptor.
    #[error("Capability mismatch on column '{column}': {message}")]
    Capability { column: String, message: String },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a precondition error for an empty field list
    pub fn empty_fields(what: impl Into<String>) -> Self {
        Self::EmptyFields(what.into())
    }

    pub(crate) fn capability(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Capability {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is an empty-field precondition error
    pub fn is_empty_fields(&self) -> bool {
        matches!(self, Self::EmptyFields(_))
    }

    /// The underlying driver error, if this error came from the database.
    pub fn as_db_error(&self) -> Option<&tokio_postgres::error::DbError> {
        match self {
            Self::Query(e) => e.as_db_error(),
            _ => None,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_message() {
        let err = OrmError::empty_fields("conflict fields for upsert");
        assert!(err.is_empty_fields());
        assert_eq!(err.to_string(), "fields is empty: conflict fields for upsert");
    }

    #[test]
    fn test_decode_message() {
        let err = OrmError::decode("email", "unexpected null");
        assert_eq!(
            err.to_string(),
            "Decode error on column 'email': unexpected null"
        );
        assert!(err.as_db_error().is_none());
    }
}
