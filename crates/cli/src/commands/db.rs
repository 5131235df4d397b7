//! Database health commands.

use store_rating_server::db::{RepositoryError, dashboard};

use super::{ConnectError, connect};

/// Errors from `db check`.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Query failed: {0}")]
    Query(#[from] RepositoryError),
}

/// Connect, then log the row count of every table.
///
/// # Errors
///
/// Returns `CheckError` if the database is unreachable or not migrated.
pub async fn check() -> Result<(), CheckError> {
    let pool = connect().await?;
    let counts = dashboard::counts(&pool).await?;

    tracing::info!(
        users = counts.total_users,
        stores = counts.total_stores,
        ratings = counts.total_ratings,
        "Database reachable"
    );

    Ok(())
}
