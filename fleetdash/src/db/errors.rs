use thiserror::Error;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// The record store does not have a table or column we were configured to read.
    /// Usually means a capability is enabled in config that the schema doesn't back.
    #[error("Record store schema mismatch: {message}")]
    SchemaMismatch { code: String, message: String },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// Postgres SQLSTATE codes for missing relations / columns
const UNDEFINED_TABLE: &str = "42P01";
const UNDEFINED_COLUMN: &str = "42703";

/// Convert from sqlx::Error using proper sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let code = db_err.code().map(|c| c.into_owned());
            if let Some(code @ (UNDEFINED_TABLE | UNDEFINED_COLUMN)) = code.as_deref() {
                return DbError::SchemaMismatch {
                    code: code.to_string(),
                    message: db_err.message().to_string(),
                };
            }
        }

        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            // All other sqlx errors are non-recoverable - convert to anyhow with context
            err => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
