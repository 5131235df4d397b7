//! Administrator route handlers (`ADMIN` role only).

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use store_rating_core::{Address, DisplayName, Email, Role, StoreId, UserId};

use super::auth::CreatedUserResponse;
use super::{AppJson, AppQuery};
use crate::db::dashboard::{self, DashboardCounts};
use crate::db::stores::{NewStore, StoreFilter, StoreRepository};
use crate::db::users::{UserFilter, UserRepository};
use crate::db::{SortOrder, contains_pattern};
use crate::error::{AppError, Result};
use crate::models::{AdminStoreListing, UserListing};
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query parameters for the user listing.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl UserListQuery {
    /// Convert to repository filters, ignoring blank values.
    fn into_filter(self) -> Result<UserFilter> {
        let role = self
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::parse::<Role>)
            .transpose()?;

        Ok(UserFilter {
            name: contains_pattern(self.name.as_deref()),
            email: contains_pattern(self.email.as_deref()),
            address: contains_pattern(self.address.as_deref()),
            role,
            sort: self.sort,
        })
    }
}

/// Body for creating an account of any role.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub role: String,
}

/// Query parameters for the admin store listing.
#[derive(Debug, Default, Deserialize)]
pub struct StoreListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Body for creating a store.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    pub owner_id: Option<i32>,
}

/// Response for a newly created store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStoreResponse {
    pub message: &'static str,
    pub store_id: StoreId,
}

// =============================================================================
// Handlers
// =============================================================================

/// Platform totals.
#[instrument(skip_all)]
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardCounts>> {
    let counts = dashboard::counts(state.pool()).await?;
    Ok(Json(counts))
}

/// List accounts, filtered and sorted by name.
#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserListQuery>,
) -> Result<Json<Vec<UserListing>>> {
    let filter = query.into_filter()?;
    let users = UserRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(users))
}

/// Create an account with an explicit role.
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse> {
    let role: Role = body.role.trim().parse()?;

    let user = AuthService::new(state.pool())
        .register(&Registration {
            name: &body.name,
            email: &body.email,
            password: &body.password,
            address: &body.address,
            role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            message: "User created",
            user_id: user.id,
        }),
    ))
}

/// List stores with owner and rating aggregate.
#[instrument(skip_all)]
pub async fn list_stores(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StoreListQuery>,
) -> Result<Json<Vec<AdminStoreListing>>> {
    let filter = StoreFilter {
        name: contains_pattern(query.name.as_deref()),
        email: contains_pattern(query.email.as_deref()),
        address: contains_pattern(query.address.as_deref()),
        sort: query.sort,
    };

    let stores = StoreRepository::new(state.pool())
        .list_for_admin(&filter)
        .await?;
    Ok(Json(stores))
}

/// Create a store for an existing `STORE_OWNER`.
#[instrument(skip_all)]
pub async fn create_store(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateStoreRequest>,
) -> Result<impl IntoResponse> {
    let name = DisplayName::parse(&body.name)?;
    let email = Email::parse(&body.email)?;
    let address = Address::parse(&body.address)?;
    let owner_id = body
        .owner_id
        .map(UserId::new)
        .ok_or_else(|| AppError::BadRequest("ownerId is required".to_owned()))?;

    let store = StoreRepository::new(state.pool())
        .create_for_owner(&NewStore {
            name: &name,
            email: &email,
            address: &address,
            owner_id,
        })
        .await?
        .ok_or_else(|| AppError::BadRequest("Owner not found or is not a STORE_OWNER".to_owned()))?;

    tracing::info!(store_id = %store.id, owner_id = %owner_id, "store created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedStoreResponse {
            message: "Store created",
            store_id: store.id,
        }),
    ))
}
