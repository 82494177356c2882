//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`MissingField`] thrown when a required signup or request field is empty.
//! - [`ExistingKey`] thrown when an email is already registered.
//! - [`AlreadyAssigned`] thrown when a request lost the acceptance race.
//!
//!  [`MissingField`]: EngineError::MissingField
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`AlreadyAssigned`]: EngineError::AlreadyAssigned
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" is required!")]
    MissingField(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already assigned!")]
    AlreadyAssigned(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Password hash: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::AlreadyAssigned(a), Self::AlreadyAssigned(b)) => a == b,
            (Self::InvalidStatus(a), Self::InvalidStatus(b)) => a == b,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
