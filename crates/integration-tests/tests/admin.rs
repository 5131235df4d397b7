//! Admin user and store management.
//!
//! Needs `STORE_RATING_ADMIN_EMAIL` and `STORE_RATING_ADMIN_PASSWORD`.

use reqwest::StatusCode;
use serde_json::{Value, json};
use store_rating_integration_tests::{
    Session, admin_session, api, client, create_account, create_store, new_user_session, rate,
    unique_email,
};

async fn list_users(client: &reqwest::Client, admin: &Session, query: &str) -> Vec<Value> {
    admin
        .auth(client.get(api(&format!("/admin/users?{query}"))))
        .send()
        .await
        .expect("Failed to list users")
        .json()
        .await
        .expect("Failed to decode body")
}

async fn total_users(client: &reqwest::Client, admin: &Session) -> i64 {
    let body: Value = admin
        .auth(client.get(api("/admin/dashboard")))
        .send()
        .await
        .expect("Failed to call dashboard")
        .json()
        .await
        .expect("Failed to decode body");
    body["totalUsers"].as_i64().expect("totalUsers missing")
}

#[tokio::test]
#[ignore = "Requires running store rating server, database and admin credentials"]
async fn test_dashboard_counts_track_new_users() {
    let client = client();
    let admin = admin_session(&client).await;

    let before = total_users(&client, &admin).await;
    new_user_session(&client).await;
    let after = total_users(&client, &admin).await;
    assert!(after > before);
}

#[tokio::test]
#[ignore = "Requires running store rating server, database and admin credentials"]
async fn test_store_owner_must_have_owner_role() {
    let client = client();
    let admin = admin_session(&client).await;
    let user = new_user_session(&client).await;
    let store_email = unique_email("rejected-store");

    let resp = admin
        .auth(client.post(api("/admin/stores")))
        .json(&json!({
            "name": "Rejected Integration Test Store",
            "email": store_email,
            "address": "0 Nowhere Road",
            "ownerId": user.user.id,
        }))
        .send()
        .await
        .expect("Failed to create store");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let stores: Vec<Value> = admin
        .auth(client.get(api(&format!("/admin/stores?email={store_email}"))))
        .send()
        .await
        .expect("Failed to list stores")
        .json()
        .await
        .expect("Failed to decode body");
    assert!(stores.is_empty());
}

#[tokio::test]
#[ignore = "Requires running store rating server, database and admin credentials"]
async fn test_admin_store_listing_includes_owner() {
    let client = client();
    let admin = admin_session(&client).await;
    let owner = create_account(&client, &admin, "STORE_OWNER").await;
    let store_id = create_store(&client, &admin, owner.user.id).await;

    let stores: Vec<Value> = admin
        .auth(client.get(api("/admin/stores")))
        .send()
        .await
        .expect("Failed to list stores")
        .json()
        .await
        .expect("Failed to decode body");
    let entry = stores
        .iter()
        .find(|s| s["id"] == store_id)
        .expect("store missing from listing");
    assert_eq!(entry["owner"]["email"], owner.user.email.as_str());
    assert!(entry["averageRating"].is_null());
}

#[tokio::test]
#[ignore = "Requires running store rating server, database and admin credentials"]
async fn test_user_filter_by_role() {
    let client = client();
    let admin = admin_session(&client).await;
    create_account(&client, &admin, "STORE_OWNER").await;

    let users: Vec<Value> = admin
        .auth(client.get(api("/admin/users?role=STORE_OWNER&sort=desc")))
        .send()
        .await
        .expect("Failed to list users")
        .json()
        .await
        .expect("Failed to decode body");
    assert!(!users.is_empty());
    assert!(users.iter().all(|u| u["role"] == "STORE_OWNER"));
}

#[tokio::test]
#[ignore = "Requires running store rating server, database and admin credentials"]
async fn test_unknown_role_is_bad_request() {
    let client = client();
    let admin = admin_session(&client).await;

    let resp = admin
        .auth(client.post(api("/admin/users")))
        .json(&json!({
            "name": "Superuser Integration Test Account",
            "email": unique_email("super"),
            "password": "Passw0rd!",
            "address": "3 Root Street",
            "role": "SUPERUSER",
        }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running store rating server, database and admin credentials"]
async fn test_user_listing_store_rating() {
    let client = client();
    let admin = admin_session(&client).await;
    let rated_owner = create_account(&client, &admin, "STORE_OWNER").await;
    let storeless_owner = create_account(&client, &admin, "STORE_OWNER").await;
    let store_id = create_store(&client, &admin, rated_owner.user.id).await;

    let user = new_user_session(&client).await;
    assert_eq!(rate(&client, &user, store_id, 4).await.status(), StatusCode::CREATED);

    let owners = list_users(&client, &admin, "role=STORE_OWNER").await;
    let rated = owners
        .iter()
        .find(|u| u["id"] == rated_owner.user.id)
        .expect("rated owner missing from listing");
    assert_eq!(rated["storeRating"].as_f64(), Some(4.0));

    let storeless = owners
        .iter()
        .find(|u| u["id"] == storeless_owner.user.id)
        .expect("owner without store missing from listing");
    assert!(storeless["storeRating"].is_null());

    let users = list_users(&client, &admin, &format!("email={}", user.user.email)).await;
    let [listed] = users.as_slice() else {
        panic!("expected exactly one USER row, got {}", users.len());
    };
    assert_eq!(listed["role"], "USER");
    assert!(listed["storeRating"].is_null());
}
