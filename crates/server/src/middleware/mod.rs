//! HTTP middleware stack for the API server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request and response)
//! 4. CORS
//! 5. Per group: rate limiting on `/api/auth`, role gate on the others

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod request_id;

pub use auth::{AuthRejection, RequireAuth, RoleGate, require_role};
pub use cors::cors_layer;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
