//! Core types for the store rating platform.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod email;
pub mod id;
pub mod name;
pub mod rating;
pub mod role;

pub use address::{Address, AddressError};
pub use email::{Email, EmailError};
pub use id::*;
pub use name::{DisplayName, DisplayNameError};
pub use rating::{AverageRating, RatingError, RatingSummary, RatingValue};
pub use role::{Role, RoleError};
