//! Authentication service.
//!
//! Password registration, login and password changes, plus the signed
//! session tokens handed out on login (see [`token`]).

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenError, TokenService};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use store_rating_core::{Address, DisplayName, Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
const MAX_PASSWORD_LENGTH: usize = 16;

/// Characters that satisfy the "special character" rule.
const SPECIAL_CHARACTERS: &str = r#"!@#$%^&*(),.?":{}|<>"#;

/// Hash checked against when the login email is unknown, so a miss costs
/// the same as a wrong password. Only dereferenced on the blocking pool.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password_blocking("Dummy-Password!").unwrap_or_default());

/// Raw account fields as submitted, validated by [`AuthService::register`].
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub address: &'a str,
    pub role: Role,
}

/// Authentication service.
///
/// Handles user registration, login, and password changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account.
    ///
    /// Fields are checked in the order name, email, password, address and
    /// the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidName`, `InvalidEmail`, `WeakPassword` or
    /// `InvalidAddress` if a field fails validation.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, registration: &Registration<'_>) -> Result<User, AuthError> {
        let name = DisplayName::parse(registration.name)?;
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;
        let address = Address::parse(registration.address)?;

        let password_hash = hash_password(registration.password).await?;

        let user = self
            .users
            .create(&NewUser {
                name: &name,
                email: &email,
                address: &address,
                role: registration.role,
                password_hash: &password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "account registered");

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is malformed or
    /// unknown, or the password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let found = match Email::parse(email) {
            Ok(email) => self.users.get_with_password_hash(&email).await?,
            Err(_) => None,
        };

        let Some((user, password_hash)) = found else {
            let _ = verify_dummy_password(password).await;
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash).await?;

        Ok(user)
    }

    /// Change the password of an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password fails the policy.
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    /// Returns `AuthError::IncorrectPassword` if the old password is wrong.
    pub async fn update_password(
        &self,
        user_id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;

        let current_hash = self
            .users
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(old_password, &current_hash)
            .await
            .map_err(|e| match e {
                AuthError::InvalidCredentials => AuthError::IncorrectPassword,
                other => other,
            })?;

        let new_hash = hash_password(new_password).await?;
        self.users
            .update_password(user_id, &new_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user_id, "password updated");

        Ok(())
    }
}

/// Validate a password against the password policy.
///
/// 8-16 characters, with at least one uppercase letter and at least one
/// character from `!@#$%^&*(),.?":{}|<>`.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` naming the first rule that failed.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let length = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(AuthError::WeakPassword(format!(
            "password must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    if !password.chars().any(char::is_uppercase) {
        return Err(AuthError::WeakPassword(
            "password must contain at least one uppercase letter".to_owned(),
        ));
    }

    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(AuthError::WeakPassword(format!(
            "password must contain at least one special character ({SPECIAL_CHARACTERS})"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id on the current thread.
///
/// Prefer [`hash_password`] from async code.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password_blocking(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Hash a password using Argon2id on the blocking thread pool.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails or the task panics.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

/// Compute the dummy login hash ahead of the first unknown-email login.
///
/// Call once at startup, before serving requests.
pub fn warm_dummy_hash() {
    LazyLock::force(&DUMMY_HASH);
}

fn verify_password_blocking(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Spend one verification against the dummy hash. The caller discards the result.
async fn verify_dummy_password(password: &str) -> Result<(), AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &DUMMY_HASH))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

/// Verify a password against a stored hash on the blocking thread pool.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password does not match
/// or the stored hash cannot be parsed.
pub async fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let password = password.to_owned();
    let hash = hash.to_owned();

    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &hash))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_accepts_policy_compliant() {
        assert!(validate_password("Secret#123").is_ok());
        assert!(validate_password("Abcdefg!").is_ok());
        assert!(validate_password("Abcdefghijklmno?").is_ok());
    }

    #[test]
    fn test_validate_password_length() {
        let err = validate_password("Ab!1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "password must be between 8 and 16 characters"
        );
        assert!(validate_password("Abcdefghijklmnop!").is_err());
    }

    #[test]
    fn test_validate_password_requires_uppercase() {
        let err = validate_password("lowercase!1").unwrap_err();
        assert!(err.to_string().contains("uppercase"));
    }

    #[test]
    fn test_validate_password_requires_special_character() {
        let err = validate_password("NoSpecial123").unwrap_err();
        assert!(err.to_string().contains("special character"));

        // '-' and '_' are not in the accepted set
        assert!(validate_password("Under_score-1").is_err());
    }

    #[tokio::test]
    async fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Secret#123").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Secret#123", &hash).await.is_ok());
        assert!(matches!(
            verify_password("Secret#124", &hash).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let a = hash_password("Secret#123").await.unwrap();
        let b = hash_password("Secret#123").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("Secret#123", "not-a-phc-string").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_dummy_hash_is_valid_phc() {
        warm_dummy_hash();
        assert!(PasswordHash::new(&DUMMY_HASH).is_ok());
    }

    #[tokio::test]
    async fn test_dummy_verification_runs_on_blocking_pool() {
        assert!(matches!(
            verify_dummy_password("Secret#123").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
