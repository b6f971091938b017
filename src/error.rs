use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::applications::ApplicationStatus;

/// Failures raised by the storage layer (the application repository and the
/// directories it sits next to).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    /// A uniqueness constraint rejected the write.
    #[error("uniqueness constraint violated")]
    Conflict,
    /// A conditional update found the record in a different status.
    #[error("record is now {0}")]
    StatusChanged(ApplicationStatus),
    #[error("database error: {0}")]
    Database(#[source] DieselError),
    #[error("could not acquire a database connection: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl From<DieselError> for StoreError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::NotFound => StoreError::NotFound,
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            ) => StoreError::Conflict,
            e => StoreError::Database(e),
        }
    }
}
