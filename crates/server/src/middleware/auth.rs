//! Bearer-token authentication and role gating.
//!
//! Each route group is wrapped in [`require_role`], which verifies the
//! `Authorization: Bearer <token>` header and checks the token's role against
//! the single role the group allows. Handlers read the verified caller with
//! the [`RequireAuth`] extractor.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use store_rating_core::Role;

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;
use crate::services::auth::TokenError;
use crate::state::AppState;

/// Error returned when a request fails authentication or authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization: Bearer` header.
    MissingToken,
    /// Token is malformed, badly signed or expired.
    InvalidToken,
    /// Token is valid but its role is not allowed here.
    Forbidden,
}

impl From<AuthRejection> for AppError {
    fn from(rejection: AuthRejection) -> Self {
        match rejection {
            AuthRejection::MissingToken => Self::Unauthorized("No token provided".to_owned()),
            AuthRejection::InvalidToken => {
                Self::Unauthorized("Invalid or expired token".to_owned())
            }
            AuthRejection::Forbidden => {
                Self::Forbidden("Access denied: insufficient permissions".to_owned())
            }
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Verify the bearer token on a request.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CurrentUser, AuthRejection> {
    let token = bearer_token(headers).ok_or(AuthRejection::MissingToken)?;

    state.tokens().verify(token).map_err(|e| {
        if matches!(e, TokenError::Expired) {
            tracing::debug!("rejected expired token");
        }
        AuthRejection::InvalidToken
    })
}

/// Extractor that requires a valid session token of any role.
///
/// Reuses the identity attached by [`require_role`] when the route sits
/// behind a role gate, and verifies the header itself otherwise.
///
/// # Example
///
/// ```rust,ignore
/// async fn whoami(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(Self(user.clone()));
        }

        let user = authenticate(state, &parts.headers)?;
        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(user))
    }
}

/// State for [`require_role`]: the app state plus the one role allowed through.
#[derive(Clone)]
pub struct RoleGate {
    state: AppState,
    role: Role,
}

impl RoleGate {
    #[must_use]
    pub const fn new(state: AppState, role: Role) -> Self {
        Self { state, role }
    }
}

/// Middleware that admits only callers whose token carries exactly the gate's role.
///
/// Responds 401 for a missing or invalid token and 403 for any other role.
/// On success the caller is attached to the request extensions.
///
/// ```rust,ignore
/// Router::new()
///     .route("/dashboard", get(dashboard))
///     .route_layer(middleware::from_fn_with_state(
///         RoleGate::new(state.clone(), Role::Admin),
///         require_role,
///     ))
/// ```
pub async fn require_role(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let user = authenticate(&gate.state, request.headers())?;

    if user.role != gate.role {
        tracing::debug!(
            user_id = %user.id,
            role = %user.role,
            required = %gate.role,
            "role gate denied request"
        );
        return Err(AuthRejection::Forbidden);
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_rejection_status_codes() {
        use axum::http::StatusCode;

        assert_eq!(
            AuthRejection::MissingToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::InvalidToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
