//! Business logic services for the store rating server.
//!
//! # Services
//!
//! - `auth` - Account registration, password login and session tokens
//!
//! Store and rating operations are single repository calls and live in the
//! route handlers.

pub mod auth;
