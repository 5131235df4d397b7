//! Store repository for database operations.
//!
//! Average ratings are derived from `SUM`/`COUNT` computed in the same
//! query as the listing, see [`RatingSummary`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_rating_core::{
    Address, DisplayName, Email, RatingSummary, RatingValue, StoreId, UserId,
};

use super::{RepositoryError, SortOrder};
use crate::models::store::{AdminStoreListing, OwnerContact, Store, UserStoreListing};

const STORE_COLUMNS: &str = "id, name, email, address, owner_id, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for store queries.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    owner_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let email = parse_email(&row.email)?;

        Ok(Self {
            id: StoreId::new(row.id),
            name: row.name,
            email,
            address: row.address,
            owner_id: UserId::new(row.owner_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for the admin listing.
#[derive(Debug, sqlx::FromRow)]
struct AdminStoreRow {
    #[sqlx(flatten)]
    store: StoreRow,
    owner_name: String,
    owner_email: String,
    rating_sum: i64,
    rating_count: i64,
}

impl TryFrom<AdminStoreRow> for AdminStoreListing {
    type Error = RepositoryError;

    fn try_from(row: AdminStoreRow) -> Result<Self, Self::Error> {
        let summary = RatingSummary::new(row.rating_sum, row.rating_count);

        Ok(Self {
            store: row.store.try_into()?,
            owner: OwnerContact {
                name: row.owner_name,
                email: parse_email(&row.owner_email)?,
            },
            average_rating: summary.average(),
            total_ratings: summary.count,
        })
    }
}

/// Internal row type for the user listing.
#[derive(Debug, sqlx::FromRow)]
struct UserStoreRow {
    #[sqlx(flatten)]
    store: StoreRow,
    rating_sum: i64,
    rating_count: i64,
    my_rating: Option<i16>,
}

impl TryFrom<UserStoreRow> for UserStoreListing {
    type Error = RepositoryError;

    fn try_from(row: UserStoreRow) -> Result<Self, Self::Error> {
        let my_rating = row
            .my_rating
            .map(RatingValue::try_from)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid rating: {e}")))?;

        Ok(Self {
            store: row.store.try_into()?,
            average_rating: RatingSummary::new(row.rating_sum, row.rating_count).average(),
            my_rating,
        })
    }
}

fn parse_email(raw: &str) -> Result<Email, RepositoryError> {
    Email::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))
}

// =============================================================================
// Inputs
// =============================================================================

/// Validated fields for a new store.
#[derive(Debug)]
pub struct NewStore<'a> {
    pub name: &'a DisplayName,
    pub email: &'a Email,
    pub address: &'a Address,
    pub owner_id: UserId,
}

/// Filters for store listings.
///
/// Text filters are `ILIKE` patterns built with [`super::contains_pattern`].
#[derive(Debug, Default)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub sort: SortOrder,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a store by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the first store (lowest ID) owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn first_for_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            SELECT {STORE_COLUMNS}
            FROM stores
            WHERE owner_id = $1
            ORDER BY id
            LIMIT 1
            "
        ))
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a store, provided the owner exists and has the `STORE_OWNER` role.
    ///
    /// The role check and the insert are one statement, so no row is written
    /// when the check fails.
    ///
    /// # Returns
    ///
    /// Returns `None` if the owner is missing or has a different role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_for_owner(
        &self,
        new_store: &NewStore<'_>,
    ) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            INSERT INTO stores (name, email, address, owner_id)
            SELECT $1, $2, $3, u.id
            FROM users u
            WHERE u.id = $4 AND u.role = 'STORE_OWNER'
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(new_store.name.as_str())
        .bind(new_store.email)
        .bind(new_store.address.as_str())
        .bind(new_store.owner_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List stores with owner contact and rating aggregate, for admins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any email is invalid.
    pub async fn list_for_admin(
        &self,
        filter: &StoreFilter,
    ) -> Result<Vec<AdminStoreListing>, RepositoryError> {
        let dir = filter.sort.as_sql();
        let sql = format!(
            r"
            SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at, s.updated_at,
                   o.name AS owner_name, o.email AS owner_email,
                   COALESCE(SUM(r.rating), 0)::BIGINT AS rating_sum,
                   COUNT(r.id) AS rating_count
            FROM stores s
            JOIN users o ON o.id = s.owner_id
            LEFT JOIN ratings r ON r.store_id = s.id
            WHERE ($1::TEXT IS NULL OR s.name ILIKE $1)
              AND ($2::TEXT IS NULL OR s.email ILIKE $2)
              AND ($3::TEXT IS NULL OR s.address ILIKE $3)
            GROUP BY s.id, o.id
            ORDER BY s.name {dir}, s.id {dir}
            "
        );

        let rows = sqlx::query_as::<_, AdminStoreRow>(&sql)
            .bind(filter.name.as_deref())
            .bind(filter.email.as_deref())
            .bind(filter.address.as_deref())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List stores with rating aggregate and the given user's own rating.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any email or rating is invalid.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        filter: &StoreFilter,
    ) -> Result<Vec<UserStoreListing>, RepositoryError> {
        let dir = filter.sort.as_sql();
        let sql = format!(
            r"
            SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at, s.updated_at,
                   COALESCE(SUM(r.rating), 0)::BIGINT AS rating_sum,
                   COUNT(r.id) AS rating_count,
                   mine.rating AS my_rating
            FROM stores s
            LEFT JOIN ratings r ON r.store_id = s.id
            LEFT JOIN ratings mine ON mine.store_id = s.id AND mine.user_id = $1
            WHERE ($2::TEXT IS NULL OR s.name ILIKE $2)
              AND ($3::TEXT IS NULL OR s.email ILIKE $3)
              AND ($4::TEXT IS NULL OR s.address ILIKE $4)
            GROUP BY s.id, mine.id
            ORDER BY s.name {dir}, s.id {dir}
            "
        );

        let rows = sqlx::query_as::<_, UserStoreRow>(&sql)
            .bind(user_id)
            .bind(filter.name.as_deref())
            .bind(filter.email.as_deref())
            .bind(filter.address.as_deref())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
