//! JWT authentication middleware.
//!
//! Course registration answers anonymous callers with 403 itself, so the
//! middleware only attaches an [`AuthUser`] when a valid access token is
//! present and never rejects a request.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt::{Claims, validate_access_token};

/// Authenticated caller, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: claims.user_id()?,
            username: claims.username,
        })
    }
}

/// Token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Optional JWT authentication middleware
///
/// Adds `AuthUser` to extensions for a valid access token. A missing,
/// malformed or expired token leaves the request anonymous.
///
/// # Example
/// ```ignore
/// Router::new()
///     .route("/optional", get(handler))
///     .layer(middleware::from_fn_with_state(state.clone(), optional_auth_middleware))
/// ```
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match validate_access_token(token, &state.jwt_config.secret).and_then(AuthUser::try_from) {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring invalid bearer token"),
        }
    }

    next.run(request).await
}
