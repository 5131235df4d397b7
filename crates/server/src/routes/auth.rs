//! Authentication route handlers.
//!
//! Signup, login and password change. Login returns a bearer token that
//! every other `/api` group requires.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use store_rating_core::{Email, Role, UserId};

use super::{AppJson, MessageResponse};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub address: String,
}

/// Response for a newly created account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUserResponse {
    pub message: &'static str,
    pub user_id: UserId,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of the logged-in account.
#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

/// Password change request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new `USER` account.
#[tracing::instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(body): AppJson<SignupRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .register(&Registration {
            name: &body.name,
            email: &body.email,
            password: &body.password,
            address: &body.address,
            role: Role::User,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            message: "User registered successfully",
            user_id: user.id,
        }),
    ))
}

/// Exchange email and password for a session token.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    let token = state.tokens().issue(&user)?;

    tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");

    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    }))
}

/// Change the caller's password.
#[tracing::instrument(skip_all)]
pub async fn update_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(body): AppJson<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    AuthService::new(state.pool())
        .update_password(user.id, &body.old_password, &body.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}
