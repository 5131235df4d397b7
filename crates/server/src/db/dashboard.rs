//! Platform-wide totals for the admin dashboard.

use serde::Serialize;
use sqlx::PgPool;

use super::RepositoryError;

/// Row counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

/// Count users, stores and ratings in one round trip.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn counts(pool: &PgPool) -> Result<DashboardCounts, RepositoryError> {
    let counts = sqlx::query_as::<_, DashboardCounts>(
        r"
        SELECT (SELECT COUNT(*) FROM users) AS total_users,
               (SELECT COUNT(*) FROM stores) AS total_stores,
               (SELECT COUNT(*) FROM ratings) AS total_ratings
        ",
    )
    .fetch_one(pool)
    .await?;

    Ok(counts)
}
