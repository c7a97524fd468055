//! Shared error types for the services crate.

use thiserror::Error;

use playtest_core::model::TransactionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `LuminariasService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LuminariasError {
    #[error("insufficient Luminarias: balance {balance}, requested {requested}")]
    InsufficientBalance { balance: i64, requested: u32 },
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for LuminariasError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InsufficientBalance { balance, requested } => {
                LuminariasError::InsufficientBalance { balance, requested }
            }
            other => LuminariasError::Storage(other),
        }
    }
}

/// Errors emitted by practice planning and session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    #[error("no questions available for practice")]
    EmptyPool,
    #[error("practice session already completed")]
    Completed,
    #[error("invalid session length: {0}")]
    InvalidSessionLength(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Luminarias(#[from] LuminariasError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
