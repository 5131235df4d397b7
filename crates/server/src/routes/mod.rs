//! HTTP route handlers for the JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - API banner
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database)
//!
//! # Auth (rate limited)
//! POST /api/auth/signup           - Register a USER account
//! POST /api/auth/login            - Exchange credentials for a token
//! PUT  /api/auth/update-password  - Change password (any role)
//!
//! # Admin (ADMIN)
//! GET  /api/admin/dashboard       - Platform totals
//! GET  /api/admin/users           - List accounts
//! POST /api/admin/users           - Create an account
//! GET  /api/admin/stores          - List stores
//! POST /api/admin/stores          - Create a store
//!
//! # User (USER)
//! GET  /api/user/stores           - List stores with own rating
//! POST /api/user/ratings          - Submit or replace a rating
//!
//! # Owner (STORE_OWNER)
//! GET  /api/owner/my-store        - Own store and its average
//! GET  /api/owner/raters          - Who rated the store
//! ```

pub mod admin;
pub mod auth;
pub mod owner;
pub mod user;

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use serde::Serialize;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use store_rating_core::Role;

use crate::error::AppError;
use crate::middleware::{
    RoleGate, auth_rate_limiter, cors_layer, request_id_middleware, require_role,
};
use crate::state::AppState;

// =============================================================================
// Shared Extractors and Responses
// =============================================================================

/// JSON body extractor whose rejection is a JSON `400`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string extractor whose rejection is a JSON `400`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Body of responses that only carry a message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Wrap a route group so only `role` gets through.
fn gated(routes: Router<AppState>, state: &AppState, role: Role) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(
        RoleGate::new(state.clone(), role),
        require_role,
    ))
}

/// Create the auth routes router.
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/update-password", put(auth::update_password))
        .layer(auth_rate_limiter(&state.config().rate_limit))
}

/// Create the admin routes router.
pub fn admin_routes(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/stores", get(admin::list_stores).post(admin::create_store));
    gated(routes, state, Role::Admin)
}

/// Create the user routes router.
pub fn user_routes(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/stores", get(user::list_stores))
        .route("/ratings", post(user::submit_rating));
    gated(routes, state, Role::User)
}

/// Create the store owner routes router.
pub fn owner_routes(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/my-store", get(owner::my_store))
        .route("/raters", get(owner::raters));
    gated(routes, state, Role::StoreOwner)
}

/// Create all `/api` routes.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state))
        .nest("/admin", admin_routes(state))
        .nest("/user", user_routes(state))
        .nest("/owner", owner_routes(state))
}

/// Build the complete application router with its middleware stack.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_allowed_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes(&state))
        .fallback(not_found)
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

// =============================================================================
// Top-level Handlers
// =============================================================================

/// API banner.
async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Store Rating Platform API is running"))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_owned())
}
