//! Session-token extraction.
//!
//! Runs on every request. Reads the `bazaar_session` cookie (set by the auth
//! routes) or an `Authorization: Bearer` header and stores the raw token as a
//! request extension. Nothing is rejected here: a missing or stale token makes
//! the request anonymous, and each handler decides what anonymous callers may
//! do.

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

/// Name of the session cookie issued at login/signup.
pub const SESSION_COOKIE: &str = "bazaar_session";

/// Raw session token carried by the current request, if any.
#[derive(Debug, Clone)]
pub struct RequestToken(pub Option<String>);

impl RequestToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

pub async fn resolve_request_token(
    cookies: Cookies,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| bearer_token(req.headers()));

    req.extensions_mut().insert(RequestToken(token));
    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
