//! Domain models returned by repositories and serialized by handlers.
//!
//! All models serialize with camelCase field names to match the JSON API.
//! Password hashes never appear in these types.

pub mod rating;
pub mod session;
pub mod store;
pub mod user;

pub use rating::{Rater, RaterContact, Rating};
pub use session::CurrentUser;
pub use store::{AdminStoreListing, OwnerContact, Store, UserStoreListing};
pub use user::{User, UserListing};
