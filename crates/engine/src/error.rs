//! The module contains the errors the engine can return.
//!
//! - [`Validation`] the input broke one or more field rules.
//! - [`NotFound`] a referenced row does not exist.
//! - [`Conflict`] a uniqueness rule or a duplicate association.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`NotFound`]: EngineError::NotFound
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::ValidationErrors;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{message}")]
    Conflict { field: &'static str, message: String },
    #[error("credential hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub(crate) fn conflict(field: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            field,
            message: message.into(),
        }
    }

    /// Turns a storage-level unique violation into [`EngineError::Conflict`].
    ///
    /// `classify` receives the driver message (e.g. `UNIQUE constraint
    /// failed: users.email`) and names the colliding field. Any other
    /// database error is kept as is.
    pub(crate) fn from_unique_violation<F>(err: DbErr, classify: F) -> Self
    where
        F: FnOnce(&str) -> (&'static str, String),
    {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                let (field, message) = classify(&detail);
                tracing::debug!("unique constraint caught a duplicate on {field}: {detail}");
                Self::Conflict { field, message }
            }
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (
                Self::Conflict {
                    field: fa,
                    message: ma,
                },
                Self::Conflict {
                    field: fb,
                    message: mb,
                },
            ) => fa == fb && ma == mb,
            (Self::Hashing(a), Self::Hashing(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_database_errors_are_kept() {
        let err = EngineError::from_unique_violation(DbErr::Custom("boom".to_string()), |_| {
            ("email", "unused".to_string())
        });
        assert!(matches!(err, EngineError::Database(DbErr::Custom(_))));
    }
}
