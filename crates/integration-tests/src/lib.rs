//! End-to-end tests for the store rating API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! sr-cli migrate
//!
//! # Bootstrap an administrator for the admin suites
//! SR_CLI_PASSWORD='Adm1n!Pass' sr-cli user create \
//!     -e admin@example.com -n "Integration Test Administrator" -a "1 Test Street" -r ADMIN
//!
//! # Start the server with room for every fixture login from this machine
//! RATE_LIMIT_AUTH_BURST=1000 cargo run -p store-rating-server
//!
//! # Run the ignored tests
//! STORE_RATING_ADMIN_EMAIL=admin@example.com STORE_RATING_ADMIN_PASSWORD='Adm1n!Pass' \
//!     cargo test -p store-rating-integration-tests -- --ignored
//! ```
//!
//! Every fixture signs up and logs in through `/api/auth`, which is rate
//! limited per client IP. With the default burst of 5 the suite gets `429`
//! responses, so the server under test needs a raised `RATE_LIMIT_AUTH_BURST`.
//!
//! # Environment
//!
//! - `STORE_RATING_BASE_URL` - Server address (default `http://localhost:5000`)
//! - `STORE_RATING_ADMIN_EMAIL` / `STORE_RATING_ADMIN_PASSWORD` - Admin login

#![allow(clippy::missing_panics_doc)]

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

/// Password that satisfies the signup policy.
pub const PASSWORD: &str = "Passw0rd!";

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("STORE_RATING_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Absolute URL for an `/api` path.
#[must_use]
pub fn api(path: &str) -> String {
    format!("{}/api{path}", base_url())
}

/// An email address no previous run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

/// A display name long enough to pass validation.
#[must_use]
pub fn display_name(label: &str) -> String {
    format!("{label} Integration Test Account")
}

/// Logged-in account returned by `/api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Session {
    /// Attach this session's bearer token.
    #[must_use]
    pub fn auth(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }
}

/// Shared HTTP client.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// POST `/api/auth/signup` for a fresh `USER`.
pub async fn signup(client: &Client, email: &str) -> Response {
    client
        .post(api("/auth/signup"))
        .json(&json!({
            "name": display_name("Signup"),
            "email": email,
            "password": PASSWORD,
            "address": "42 Integration Avenue",
        }))
        .send()
        .await
        .expect("Failed to call signup")
}

/// POST `/api/auth/login`.
pub async fn login_raw(client: &Client, email: &str, password: &str) -> Response {
    client
        .post(api("/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to call login")
}

/// Log in and decode the session, panicking on failure.
pub async fn login(client: &Client, email: &str, password: &str) -> Session {
    let resp = login_raw(client, email, password).await;
    assert!(resp.status().is_success(), "login failed: {}", resp.status());
    resp.json().await.expect("Failed to decode login response")
}

/// Sign up a new `USER` and log in as them.
pub async fn new_user_session(client: &Client) -> Session {
    let email = unique_email("user");
    let resp = signup(client, &email).await;
    assert!(resp.status().is_success(), "signup failed: {}", resp.status());
    login(client, &email, PASSWORD).await
}

/// Log in as the bootstrapped administrator.
pub async fn admin_session(client: &Client) -> Session {
    let email = std::env::var("STORE_RATING_ADMIN_EMAIL")
        .expect("STORE_RATING_ADMIN_EMAIL must be set for admin tests");
    let password = std::env::var("STORE_RATING_ADMIN_PASSWORD")
        .expect("STORE_RATING_ADMIN_PASSWORD must be set for admin tests");
    login(client, &email, &password).await
}

/// Create an account of `role` through the admin API and log in as it.
pub async fn create_account(client: &Client, admin: &Session, role: &str) -> Session {
    let email = unique_email(&role.to_ascii_lowercase());
    let resp = admin
        .auth(client.post(api("/admin/users")))
        .json(&json!({
            "name": display_name(role),
            "email": email,
            "password": PASSWORD,
            "address": "7 Fixture Road",
            "role": role,
        }))
        .send()
        .await
        .expect("Failed to create account");
    assert_eq!(resp.status().as_u16(), 201, "create {role} failed");
    login(client, &email, PASSWORD).await
}

/// Create a store for `owner_id` and return the store ID.
pub async fn create_store(client: &Client, admin: &Session, owner_id: i32) -> i32 {
    let resp = admin
        .auth(client.post(api("/admin/stores")))
        .json(&json!({
            "name": "Integration Test Hardware Store",
            "email": unique_email("store"),
            "address": "99 Market Square",
            "ownerId": owner_id,
        }))
        .send()
        .await
        .expect("Failed to create store");
    assert_eq!(resp.status().as_u16(), 201, "create store failed");
    let body: Value = resp.json().await.expect("Failed to decode store response");
    let id = body["storeId"].as_i64().expect("storeId missing");
    i32::try_from(id).expect("storeId out of range")
}

/// Submit a rating as `user`.
pub async fn rate(client: &Client, user: &Session, store_id: i32, rating: i64) -> Response {
    user.auth(client.post(api("/user/ratings")))
        .json(&json!({ "storeId": store_id, "rating": rating }))
        .send()
        .await
        .expect("Failed to submit rating")
}
