//! Authenticated request identity.

use serde::{Deserialize, Serialize};

use store_rating_core::{Email, Role, UserId};

/// The caller identified by a verified session token.
///
/// Built from token claims, not from the database, so the role is the one
/// the account had when the token was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Role the token was issued for.
    pub role: Role,
    /// User's display name.
    pub name: String,
}
