//! Store Rating Core - Shared domain types.
//!
//! This crate provides the validated types used across the store rating
//! platform:
//! - `server` - JSON API for admins, users and store owners
//! - `cli` - Command-line tools for migrations and user bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Database encoding is available behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, names, addresses, roles and ratings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
