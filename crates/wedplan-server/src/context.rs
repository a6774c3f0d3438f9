//! Request authentication and role checks.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;
use wedplan_auth::AuthError;
use wedplan_core::models::user::{Capability, Principal};

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the token, accepted alongside `Authorization: Bearer`.
pub const TOKEN_HEADER: &str = "x-auth-token";

fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(token.trim()).filter(|t| !t.is_empty());
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify the request's token and attach its [`Principal`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_headers(req.headers()).ok_or(AuthError::MissingToken)?;
    let principal = state.auth.authenticate(token)?;

    debug!(user_id = %principal.id, role = %principal.role, "Request authenticated");
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn require(req: &Request<Body>, capability: Capability) -> Result<(), ApiError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .ok_or(AuthError::MissingToken)?;

    if principal.role.grants(capability) {
        Ok(())
    } else {
        Err(ApiError::Forbidden {
            message: format!("role {} may not perform this action", principal.role),
        })
    }
}

/// Client-only routes. Must run after [`auth_middleware`].
pub async fn require_client(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    require(&req, Capability::BookWedding)?;
    Ok(next.run(req).await)
}

/// Admin-only routes. Must run after [`auth_middleware`].
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    require(&req, Capability::ManageOrders)?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn custom_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("abc"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(token_from_headers(&headers), Some("abc"));
    }

    #[test]
    fn bearer_token_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(token_from_headers(&headers), Some("xyz"));
    }

    #[test]
    fn other_schemes_and_blanks_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(TOKEN_HEADER, HeaderValue::from_static("  "));
        assert_eq!(token_from_headers(&headers), None);
    }
}
