//! Store browsing and rating handlers (`USER` role only).

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use store_rating_core::{RatingValue, StoreId};

use super::{AppJson, AppQuery};
use crate::db::ratings::RatingRepository;
use crate::db::stores::{StoreFilter, StoreRepository};
use crate::db::{RepositoryError, SortOrder, contains_pattern};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Rating, UserStoreListing};
use crate::state::AppState;

/// Query parameters for the store listing.
#[derive(Debug, Default, Deserialize)]
pub struct StoreSearchQuery {
    pub name: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Body for submitting a rating.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub store_id: Option<i32>,
    pub rating: Option<i64>,
}

/// Response for a submitted rating.
#[derive(Debug, Serialize)]
pub struct RatingSubmittedResponse {
    pub message: &'static str,
    pub rating: Rating,
}

/// List stores with their average and the caller's own rating.
#[instrument(skip_all)]
pub async fn list_stores(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppQuery(query): AppQuery<StoreSearchQuery>,
) -> Result<Json<Vec<UserStoreListing>>> {
    let filter = StoreFilter {
        name: contains_pattern(query.name.as_deref()),
        email: None,
        address: contains_pattern(query.address.as_deref()),
        sort: query.sort,
    };

    let stores = StoreRepository::new(state.pool())
        .list_for_user(user.id, &filter)
        .await?;
    Ok(Json(stores))
}

/// Create or replace the caller's rating of a store.
#[instrument(skip_all)]
pub async fn submit_rating(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(body): AppJson<SubmitRatingRequest>,
) -> Result<impl IntoResponse> {
    let store_id = body
        .store_id
        .map(StoreId::new)
        .ok_or_else(|| AppError::BadRequest("storeId is required".to_owned()))?;
    let raw_rating = body
        .rating
        .ok_or_else(|| AppError::BadRequest("rating is required".to_owned()))?;
    let value = RatingValue::try_from(raw_rating)?;

    if StoreRepository::new(state.pool())
        .get_by_id(store_id)
        .await?
        .is_none()
    {
        return Err(store_not_found());
    }

    let rating = RatingRepository::new(state.pool())
        .upsert(user.id, store_id, value)
        .await
        .map_err(|e| match e {
            // Store deleted between the check and the write
            RepositoryError::NotFound => store_not_found(),
            other => AppError::Database(other),
        })?;

    tracing::info!(
        user_id = %user.id,
        store_id = %store_id,
        rating = %value,
        "rating submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(RatingSubmittedResponse {
            message: "Rating submitted",
            rating,
        }),
    ))
}

fn store_not_found() -> AppError {
    AppError::NotFound("Store not found".to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_rating_request_uses_camel_case() {
        let body: SubmitRatingRequest =
            serde_json::from_str(r#"{"storeId":12,"rating":4}"#).unwrap();
        assert_eq!(body.store_id, Some(12));
        assert_eq!(body.rating, Some(4));
    }

    #[test]
    fn test_store_search_query_defaults() {
        let query: StoreSearchQuery = serde_json::from_str("{}").unwrap();
        assert!(query.name.is_none());
        assert_eq!(query.sort, SortOrder::Asc);
    }
}
