use crate::domain::models::ApplicantValidationError;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failures raised by repositories and units of work.
///
/// Absence of a row is never an error at this layer; reads return `Option`
/// and deletes return `bool`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error(transparent)]
    Validation(#[from] ApplicantValidationError),
    #[error("a transaction is already in progress")]
    TransactionAlreadyOpen,
    #[error("no row with ID {0} exists")]
    MissingRow(i64),
    #[error("changes were discarded because a staged write failed: {0}")]
    FlushAborted(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("unit of work has already been disposed")]
    Disposed,
}

impl StorageError {
    /// Misuse of the Idle/InTransaction state machine
    pub fn is_transaction_state(&self) -> bool {
        matches!(self, StorageError::TransactionAlreadyOpen)
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation()
                || db_err.is_check_violation()
                || db_err.is_foreign_key_violation()
            {
                return StorageError::Constraint(db_err.message().to_string());
            }
        }
        StorageError::Database(err)
    }
}
