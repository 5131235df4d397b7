//! Rating repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_rating_core::{Email, RatingId, RatingSummary, RatingValue, StoreId, UserId};

use super::RepositoryError;
use crate::models::rating::{Rater, RaterContact, Rating};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct RatingRow {
    id: i32,
    user_id: i32,
    store_id: i32,
    rating: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RatingRow> for Rating {
    type Error = RepositoryError;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RatingId::new(row.id),
            user_id: UserId::new(row.user_id),
            store_id: StoreId::new(row.store_id),
            rating: parse_rating(row.rating)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RaterRow {
    id: i32,
    rating: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: i32,
    user_name: String,
    user_email: String,
}

impl TryFrom<RaterRow> for Rater {
    type Error = RepositoryError;

    fn try_from(row: RaterRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.user_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: RatingId::new(row.id),
            rating: parse_rating(row.rating)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: RaterContact {
                id: UserId::new(row.user_id),
                name: row.user_name,
                email,
            },
        })
    }
}

fn parse_rating(raw: i16) -> Result<RatingValue, RepositoryError> {
    RatingValue::try_from(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid rating in database: {e}")))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for rating database operations.
pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a rating, or overwrite the value if the user already rated this store.
    ///
    /// Resubmitting keeps the original `created_at` and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or store no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<Rating, RepositoryError> {
        let row = sqlx::query_as::<_, RatingRow>(
            r"
            INSERT INTO ratings (user_id, store_id, rating)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, store_id)
            DO UPDATE SET rating = EXCLUDED.rating, updated_at = NOW()
            RETURNING id, user_id, store_id, rating, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(store_id)
        .bind(i16::from(value))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Sum and count of all ratings for a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<RatingSummary, RepositoryError> {
        let (sum, count) = sqlx::query_as::<_, (i64, i64)>(
            r"
            SELECT COALESCE(SUM(rating), 0)::BIGINT, COUNT(*)
            FROM ratings
            WHERE store_id = $1
            ",
        )
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(RatingSummary::new(sum, count))
    }

    /// Everyone who rated a store, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any email or rating is invalid.
    pub async fn raters_for_store(&self, store_id: StoreId) -> Result<Vec<Rater>, RepositoryError> {
        let rows = sqlx::query_as::<_, RaterRow>(
            r"
            SELECT r.id, r.rating, r.created_at, r.updated_at,
                   u.id AS user_id, u.name AS user_name, u.email AS user_email
            FROM ratings r
            JOIN users u ON u.id = r.user_id
            WHERE r.store_id = $1
            ORDER BY r.updated_at DESC, r.id DESC
            ",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
