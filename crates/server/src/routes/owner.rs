//! Store owner handlers (`STORE_OWNER` role only).
//!
//! An owner's views use their first store, the one with the lowest ID.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use store_rating_core::AverageRating;

use crate::db::ratings::RatingRepository;
use crate::db::stores::StoreRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Rater, Store};
use crate::state::AppState;

/// The owner's store with its rating aggregate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyStoreResponse {
    pub store: Store,
    pub average_rating: Option<AverageRating>,
    pub total_ratings: i64,
}

async fn owned_store(state: &AppState, owner: &CurrentUser) -> Result<Store> {
    StoreRepository::new(state.pool())
        .first_for_owner(owner.id)
        .await?
        .ok_or_else(|| AppError::NotFound("No store found for this owner".to_owned()))
}

/// The caller's store, average rating and rating count.
#[instrument(skip_all)]
pub async fn my_store(
    State(state): State<AppState>,
    RequireAuth(owner): RequireAuth,
) -> Result<Json<MyStoreResponse>> {
    let store = owned_store(&state, &owner).await?;
    let summary = RatingRepository::new(state.pool())
        .summary_for_store(store.id)
        .await?;

    Ok(Json(MyStoreResponse {
        store,
        average_rating: summary.average(),
        total_ratings: summary.count,
    }))
}

/// Everyone who rated the caller's store, most recent first.
#[instrument(skip_all)]
pub async fn raters(
    State(state): State<AppState>,
    RequireAuth(owner): RequireAuth,
) -> Result<Json<Vec<Rater>>> {
    let store = owned_store(&state, &owner).await?;
    let raters = RatingRepository::new(state.pool())
        .raters_for_store(store.id)
        .await?;

    Ok(Json(raters))
}
