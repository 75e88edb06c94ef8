//! Error types for pgtable

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pgtable operations
pub type TableResult<T> = Result<T, TableError>;

/// Error types for table building and execution
#[derive(Debug, Error)]
pub enum TableError {
    /// Builder is missing configuration a statement needs (e.g. the table name)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `update()` called with nothing pending
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Column or primary key definition without a `name type` separator
    #[error("Malformed definition: {0}")]
    MalformedDefinition(String),

    /// A pending row does not line up with the declared columns
    #[error("Row {row} has {got} values, expected {expected}")]
    RowArity {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// Bound INSERT would exceed the dialect's parameter limit
    #[error("Statement needs {count} parameters, the limit is {max}")]
    TooManyParameters { count: usize, max: usize },

    /// Statement preparation or execution failed
    #[error("Execution error: {0}")]
    Execution(#[from] tokio_postgres::Error),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Statement timeout error
    #[error("Statement timeout after {0:?}")]
    Timeout(Duration),

    /// The admission gate was closed while waiting for a permit
    #[error("Admission gate closed")]
    GateClosed,

    /// Configuration could not be loaded or failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl TableError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an empty input error
    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::EmptyInput(message.into())
    }

    /// Create a malformed definition error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDefinition(message.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is an empty input error
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::EmptyInput(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if the database rejected the statement with a unique violation (SQLSTATE 23505)
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Execution(err) => err
                .as_db_error()
                .is_some_and(|db_err| db_err.code().code() == "23505"),
            _ => false,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for TableError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_and_predicates() {
        assert!(TableError::configuration("no table").is_configuration());
        assert!(TableError::empty_input("nothing").is_empty_input());
        assert!(TableError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(!TableError::malformed("x").is_unique_violation());
    }

    #[test]
    fn test_display() {
        let err = TableError::RowArity {
            row: 2,
            expected: 3,
            got: 1,
        };
        assert_eq!(err.to_string(), "Row 2 has 1 values, expected 3");

        let err = TableError::TooManyParameters {
            count: 70000,
            max: 65535,
        };
        assert_eq!(
            err.to_string(),
            "Statement needs 70000 parameters, the limit is 65535"
        );
    }
}
