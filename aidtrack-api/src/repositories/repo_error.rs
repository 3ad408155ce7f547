use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// A lookup entry cannot be removed while projects point at it.
    #[error("Still referenced by projects: {0}")]
    Referenced(String),
    /// A write named a lookup entry or project that does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

impl RepositoryError {
    /// Classify a failed write. Constraint violations become typed errors, anything else
    /// is passed through as a database error.
    pub(super) fn from_write(err: sqlx::Error, subject: impl Into<String>) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => Self::AlreadyExists(subject.into()),
            Some(db_err) if db_err.is_foreign_key_violation() => {
                Self::InvalidReference(subject.into())
            }
            _ => Self::DatabaseError(err),
        }
    }

    /// Classify a failed delete. A foreign key violation here means the row is still in use.
    pub(super) fn from_delete(err: sqlx::Error, subject: impl Into<String>) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_foreign_key_violation() => Self::Referenced(subject.into()),
            _ => Self::DatabaseError(err),
        }
    }
}
