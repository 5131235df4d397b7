//! Authentication error types.

use thiserror::Error;

use store_rating_core::{AddressError, DisplayNameError, EmailError};

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid display name.
    #[error("{0}")]
    InvalidName(#[from] DisplayNameError),

    /// Invalid email format.
    #[error("{0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid postal address.
    #[error("{0}")]
    InvalidAddress(#[from] AddressError),

    /// Password does not satisfy the password policy.
    #[error("{0}")]
    WeakPassword(String),

    /// Invalid credentials (wrong password or user not found).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The old password given to a password change did not match.
    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// The authenticated account no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("Email already registered")]
    UserAlreadyExists,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
