//! Catalog errors.

use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

use crate::domain::catalog::fields::FieldErrors;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidReference(String),

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error: {0}")]
    Sql(#[source] Error),
}

impl From<Error> for StorageError {
    fn from(error: Error) -> Self {
        let Some((kind, message)) = error
            .as_database_error()
            .map(|database| (database.kind(), database.message().to_string()))
        else {
            return Self::Sql(error);
        };

        match kind {
            ErrorKind::UniqueViolation => Self::Conflict(message),
            ErrorKind::ForeignKeyViolation => Self::InvalidReference(message),
            ErrorKind::NotNullViolation => Self::MissingRequiredData,
            ErrorKind::CheckViolation => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

/// Why a single import record was rejected.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid record: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<FieldErrors> for RecordError {
    fn from(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }
}

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("unknown entity type '{0}'")]
    UnknownEntity(String),

    #[error("entity not found")]
    NotFound,

    #[error("storage error")]
    Storage(#[from] StorageError),
}
