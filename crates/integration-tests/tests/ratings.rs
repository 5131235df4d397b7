//! Rating upsert and aggregate behavior.
//!
//! Needs `STORE_RATING_ADMIN_EMAIL` and `STORE_RATING_ADMIN_PASSWORD` for an
//! existing `ADMIN` account (see `sr-cli user create`).

use reqwest::StatusCode;
use serde_json::Value;
use store_rating_integration_tests::{
    Session, admin_session, api, client, create_account, create_store, new_user_session, rate,
};

async fn my_store(client: &reqwest::Client, owner: &Session) -> Value {
    let resp = owner
        .auth(client.get(api("/owner/my-store")))
        .send()
        .await
        .expect("Failed to call my-store");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to decode body")
}

async fn raters(client: &reqwest::Client, owner: &Session) -> Vec<Value> {
    let resp = owner
        .auth(client.get(api("/owner/raters")))
        .send()
        .await
        .expect("Failed to call raters");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to decode body")
}

#[tokio::test]
#[ignore = "Requires running store rating server, database and admin credentials"]
async fn test_store_without_ratings_has_null_average() {
    let client = client();
    let admin = admin_session(&client).await;
    let owner = create_account(&client, &admin, "STORE_OWNER").await;
    create_store(&client, &admin, owner.user.id).await;

    let body = my_store(&client, &owner).await;
    assert!(body["averageRating"].is_null());
    assert_eq!(body["totalRatings"], 0);
    assert!(raters(&client, &owner).await.is_empty());
}

#[tokio::test]
#[ignore = "Requires running store rating server, database and admin credentials"]
async fn test_rerating_replaces_previous_rating() {
    let client = client();
    let admin = admin_session(&client).await;
    let owner = create_account(&client, &admin, "STORE_OWNER").await;
    let store_id = create_store(&client, &admin, owner.user.id).await;
    let user = new_user_session(&client).await;

    assert_eq!(rate(&client, &user, store_id, 4).await.status(), StatusCode::CREATED);
    assert_eq!(rate(&client, &user, store_id, 5).await.status(), StatusCode::CREATED);

    let rows = raters(&client, &owner).await;
    assert_eq!(rows.len(), 1);
    let row = rows.first().expect("rater missing");
    assert_eq!(row["rating"], 5);
    assert_eq!(row["user"]["id"], user.user.id);

    let body = my_store(&client, &owner).await;
    assert_eq!(body["averageRating"].as_f64(), Some(5.0));
    assert_eq!(body["totalRatings"], 1);
}

#[tokio::test]
#[ignore = "Requires running store rating server, database and admin credentials"]
async fn test_average_over_multiple_users() {
    let client = client();
    let admin = admin_session(&client).await;
    let owner = create_account(&client, &admin, "STORE_OWNER").await;
    let store_id = create_store(&client, &admin, owner.user.id).await;

    let first = new_user_session(&client).await;
    let second = new_user_session(&client).await;
    rate(&client, &first, store_id, 3).await;
    rate(&client, &second, store_id, 5).await;

    let body = my_store(&client, &owner).await;
    assert_eq!(body["averageRating"].as_f64(), Some(4.0));
    assert_eq!(body["totalRatings"], 2);

    let listing: Vec<Value> = first
        .auth(client.get(api("/user/stores")))
        .send()
        .await
        .expect("Failed to list stores")
        .json()
        .await
        .expect("Failed to decode body");
    let entry = listing
        .iter()
        .find(|s| s["id"] == store_id)
        .expect("store missing from listing");
    assert_eq!(entry["myRating"], 3);
    assert_eq!(entry["averageRating"].as_f64(), Some(4.0));
}

#[tokio::test]
#[ignore = "Requires running store rating server, database and admin credentials"]
async fn test_raters_newest_first() {
    let client = client();
    let admin = admin_session(&client).await;
    let owner = create_account(&client, &admin, "STORE_OWNER").await;
    let store_id = create_store(&client, &admin, owner.user.id).await;

    let earlier = new_user_session(&client).await;
    let later = new_user_session(&client).await;
    assert_eq!(rate(&client, &earlier, store_id, 2).await.status(), StatusCode::CREATED);
    assert_eq!(rate(&client, &later, store_id, 4).await.status(), StatusCode::CREATED);

    let order: Vec<Value> = raters(&client, &owner)
        .await
        .iter()
        .map(|r| r["user"]["id"].clone())
        .collect();
    assert_eq!(order, [later.user.id, earlier.user.id]);

    // Resubmitting moves a rater back to the top.
    assert_eq!(rate(&client, &earlier, store_id, 3).await.status(), StatusCode::CREATED);

    let order: Vec<Value> = raters(&client, &owner)
        .await
        .iter()
        .map(|r| r["user"]["id"].clone())
        .collect();
    assert_eq!(order, [earlier.user.id, later.user.id]);
}

#[tokio::test]
#[ignore = "Requires running store rating server and database"]
async fn test_out_of_range_rating_is_rejected() {
    let client = client();
    let user = new_user_session(&client).await;

    let resp = rate(&client, &user, 1, 6).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = rate(&client, &user, 1, 0).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running store rating server and database"]
async fn test_rating_unknown_store_is_not_found() {
    let client = client();
    let user = new_user_session(&client).await;

    let resp = rate(&client, &user, i32::MAX, 3).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
