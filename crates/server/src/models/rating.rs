//! Rating domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use store_rating_core::{Email, RatingId, RatingValue, StoreId, UserId};

/// A user's rating of a store (domain type).
///
/// At most one exists per (user, store) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: RatingId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub rating: RatingValue,
    pub created_at: DateTime<Utc>,
    /// Bumped every time the rating is resubmitted.
    pub updated_at: DateTime<Utc>,
}

/// The user behind a rating, as shown to the store owner.
#[derive(Debug, Clone, Serialize)]
pub struct RaterContact {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// One entry in a store owner's list of raters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rater {
    pub id: RatingId,
    pub rating: RatingValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: RaterContact,
}
