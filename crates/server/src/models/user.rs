//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use store_rating_core::{AverageRating, Email, Role, UserId};

/// An account of any role (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name (20-60 characters).
    pub name: String,
    /// Login email address.
    pub email: Email,
    /// Postal address.
    pub address: String,
    /// Role deciding which route group the account may use.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A row of the admin user listing.
///
/// `store_rating` is the average rating of the owner's first store, and is
/// always `None` for accounts that are not store owners.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListing {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub store_rating: Option<AverageRating>,
}
