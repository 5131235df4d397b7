//! Store domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use store_rating_core::{AverageRating, Email, RatingValue, StoreId, UserId};

/// A rateable store (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Store name (20-60 characters).
    pub name: String,
    /// Contact email.
    pub email: Email,
    /// Postal address.
    pub address: String,
    /// The `STORE_OWNER` account this store belongs to.
    pub owner_id: UserId,
    /// When the store was created.
    pub created_at: DateTime<Utc>,
    /// When the store was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Owner details shown next to a store in the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerContact {
    pub name: String,
    pub email: Email,
}

/// A store as listed for administrators.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStoreListing {
    #[serde(flatten)]
    pub store: Store,
    pub owner: OwnerContact,
    pub average_rating: Option<AverageRating>,
    pub total_ratings: i64,
}

/// A store as listed for a `USER`, annotated with their own rating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStoreListing {
    #[serde(flatten)]
    pub store: Store,
    pub average_rating: Option<AverageRating>,
    pub my_rating: Option<RatingValue>,
}
