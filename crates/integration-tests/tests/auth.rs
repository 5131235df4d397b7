//! Signup, login and password change against a running server.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (sr-cli migrate)
//! - The server running (cargo run -p store-rating-server)

use reqwest::StatusCode;
use serde_json::{Value, json};
use store_rating_integration_tests::{
    PASSWORD, api, client, login, login_raw, new_user_session, signup, unique_email,
};

#[tokio::test]
#[ignore = "Requires running store rating server and database"]
async fn test_signup_returns_created_user_id() {
    let client = client();
    let resp = signup(&client, &unique_email("signup")).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to decode body");
    assert_eq!(body["message"], "User registered successfully");
    assert!(body["userId"].as_i64().is_some());
}

#[tokio::test]
#[ignore = "Requires running store rating server and database"]
async fn test_duplicate_signup_conflicts() {
    let client = client();
    let email = unique_email("dup");

    assert_eq!(signup(&client, &email).await.status(), StatusCode::CREATED);

    let resp = signup(&client, &email).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to decode body");
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
#[ignore = "Requires running store rating server and database"]
async fn test_signup_rejects_weak_password() {
    let client = client();
    let resp = client
        .post(api("/auth/signup"))
        .json(&json!({
            "name": "Weak Password Integration Tester",
            "email": unique_email("weak"),
            "password": "alllowercase1",
            "address": "1 Nowhere Lane",
        }))
        .send()
        .await
        .expect("Failed to call signup");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running store rating server and database"]
async fn test_login_returns_user_role() {
    let client = client();
    let email = unique_email("login");
    signup(&client, &email).await;

    let session = login(&client, &email, PASSWORD).await;
    assert_eq!(session.user.role, "USER");
    assert_eq!(session.user.email, email);
    assert!(!session.token.is_empty());
}

#[tokio::test]
#[ignore = "Requires running store rating server and database"]
async fn test_bad_credentials_share_one_message() {
    let client = client();
    let email = unique_email("creds");
    signup(&client, &email).await;

    let wrong_password = login_raw(&client, &email, "Wr0ng!Pass").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: Value = wrong_password.json().await.expect("Failed to decode body");

    let unknown = login_raw(&client, &unique_email("nobody"), PASSWORD).await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown: Value = unknown.json().await.expect("Failed to decode body");

    assert_eq!(wrong_password["message"], unknown["message"]);
}

#[tokio::test]
#[ignore = "Requires running store rating server and database"]
async fn test_update_password_then_login_with_new_password() {
    let client = client();
    let session = new_user_session(&client).await;

    let resp = session
        .auth(client.put(api("/auth/update-password")))
        .json(&json!({ "oldPassword": PASSWORD, "newPassword": "N3w!Secret" }))
        .send()
        .await
        .expect("Failed to update password");
    assert_eq!(resp.status(), StatusCode::OK);

    let old = login_raw(&client, &session.user.email, PASSWORD).await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);
    login(&client, &session.user.email, "N3w!Secret").await;
}

#[tokio::test]
#[ignore = "Requires running store rating server and database"]
async fn test_update_password_rejects_wrong_current_password() {
    let client = client();
    let session = new_user_session(&client).await;

    let resp = session
        .auth(client.put(api("/auth/update-password")))
        .json(&json!({ "oldPassword": "Wr0ng!Pass", "newPassword": "N3w!Secret" }))
        .send()
        .await
        .expect("Failed to update password");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
