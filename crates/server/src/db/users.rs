//! User repository for database operations.
//!
//! Password hashes are only ever returned alongside the user by
//! [`UserRepository::get_with_password_hash`] and
//! [`UserRepository::get_password_hash`]; every other query leaves them out.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_rating_core::{Address, DisplayName, Email, RatingSummary, Role, UserId};

use super::{RepositoryError, SortOrder, conflict_on_unique};
use crate::models::user::{User, UserListing};

const USER_COLUMNS: &str = "id, name, email, address, role, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            address: row.address,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for login lookups.
#[derive(Debug, sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Internal row type for the admin listing.
#[derive(Debug, sqlx::FromRow)]
struct UserListingRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    role: Role,
    created_at: DateTime<Utc>,
    rating_sum: Option<i64>,
    rating_count: Option<i64>,
}

impl TryFrom<UserListingRow> for UserListing {
    type Error = RepositoryError;

    fn try_from(row: UserListingRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let store_rating = match (row.rating_sum, row.rating_count) {
            (Some(sum), Some(count)) => RatingSummary::new(sum, count).average(),
            _ => None,
        };

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            address: row.address,
            role: row.role,
            created_at: row.created_at,
            store_rating,
        })
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Validated fields for a new account.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub name: &'a DisplayName,
    pub email: &'a Email,
    pub address: &'a Address,
    pub role: Role,
    pub password_hash: &'a str,
}

/// Filters for the admin user listing.
///
/// Text filters are `ILIKE` patterns built with [`super::contains_pattern`].
#[derive(Debug, Default)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
    pub sort: SortOrder,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user and their password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = row.user.try_into()?;
        Ok(Some((user, row.password_hash)))
    }

    /// Get the password hash of a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(hash)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser<'_>) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (name, email, password_hash, address, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(new_user.name.as_str())
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.address.as_str())
        .bind(new_user.role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

        row.try_into()
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_hash = $1, updated_at = NOW()
            WHERE id = $2
            ",
        )
        .bind(password_hash)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List users for the admin dashboard.
    ///
    /// Store owners carry the average rating of their first store (lowest ID).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any email is invalid.
    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<UserListing>, RepositoryError> {
        let dir = filter.sort.as_sql();
        let sql = format!(
            r"
            SELECT u.id, u.name, u.email, u.address, u.role, u.created_at,
                   owned.rating_sum, owned.rating_count
            FROM users u
            LEFT JOIN LATERAL (
                SELECT COALESCE(SUM(r.rating), 0)::BIGINT AS rating_sum,
                       COUNT(r.id) AS rating_count
                FROM ratings r
                WHERE r.store_id = (
                    SELECT s.id FROM stores s
                    WHERE s.owner_id = u.id
                    ORDER BY s.id
                    LIMIT 1
                )
            ) owned ON u.role = 'STORE_OWNER'
            WHERE ($1::TEXT IS NULL OR u.name ILIKE $1)
              AND ($2::TEXT IS NULL OR u.email ILIKE $2)
              AND ($3::TEXT IS NULL OR u.address ILIKE $3)
              AND ($4::user_role IS NULL OR u.role = $4)
            ORDER BY u.name {dir}, u.id {dir}
            "
        );

        let rows = sqlx::query_as::<_, UserListingRow>(&sql)
            .bind(filter.name.as_deref())
            .bind(filter.email.as_deref())
            .bind(filter.address.as_deref())
            .bind(filter.role)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
