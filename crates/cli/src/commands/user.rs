//! Account bootstrap commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the first administrator
//! SR_CLI_PASSWORD='Str0ng!Pass' sr-cli user create \
//!     -e admin@example.com -n "Platform Administrator" -a "1 Main Street" -r ADMIN
//! ```
//!
//! The password is read from `SR_CLI_PASSWORD` so it never appears in shell
//! history or the process list. It must satisfy the same policy as signup.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use store_rating_core::{Role, RoleError, UserId};
use store_rating_server::services::auth::{AuthError, AuthService, Registration};

use super::{ConnectError, connect};

/// Environment variable holding the new account's password.
pub const PASSWORD_ENV: &str = "SR_CLI_PASSWORD";

/// Errors that can occur during user management.
#[derive(Debug, Error)]
pub enum UserError {
    /// Password variable is missing.
    #[error("Missing environment variable: {PASSWORD_ENV}")]
    MissingPassword,

    /// Invalid role.
    #[error(transparent)]
    InvalidRole(#[from] RoleError),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Validation, duplicate email or database failure.
    #[error("Could not create user: {0}")]
    Auth(#[from] AuthError),
}

/// Create an account of any role.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError` if the password variable is missing, a field is
/// invalid, the email is taken, or the database is unreachable.
pub async fn create(
    email: &str,
    name: &str,
    address: &str,
    role: &str,
) -> Result<UserId, UserError> {
    let role: Role = role.trim().to_ascii_uppercase().parse()?;
    let password = std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|p| !p.is_empty())
        .map(SecretString::from)
        .ok_or(UserError::MissingPassword)?;

    let pool = connect().await?;

    tracing::info!("Creating user: {} ({})", email, role);

    let user = AuthService::new(&pool)
        .register(&Registration {
            name,
            email,
            password: password.expose_secret(),
            address,
            role,
        })
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user.id)
}
