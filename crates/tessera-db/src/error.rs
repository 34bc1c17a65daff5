//! Error types for the tessera-db crate.

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to establish or acquire a database connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    /// A database query failed to execute.
    #[error("Query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),

    /// A stored value could not be decoded into its domain type.
    ///
    /// Indicates data written outside the application's enum contract
    /// (e.g. an unknown product category string).
    #[error("Stored value invalid: {0}")]
    InvalidStoredValue(String),
}

impl DbError {
    /// Classify a sqlx error as connection-level or query-level.
    #[must_use]
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DbError::ConnectionFailed(err)
            }
            other => DbError::QueryFailed(other),
        }
    }

    /// Check if this error indicates a connection problem.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, DbError::ConnectionFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_connection_error() {
        let err = DbError::from_sqlx(sqlx::Error::PoolTimedOut);
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_row_not_found_is_query_error() {
        let err = DbError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(!err.is_connection_error());
    }
}
