//! Session endpoints.
//!
//! Successful signup/login answers carry the user in the body and the session
//! token in the `bazaar_session` cookie; handlers never echo the token in
//! JSON. Logout always clears the cookie, even when no session was open.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_cookies::{cookie::SameSite, Cookie, Cookies};

use bazaar_actions::ActionError;
use bazaar_auth::{SessionToken, SignupFields};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::middleware::{RequestToken, SESSION_COOKIE};

pub fn router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

fn session_cookie(token: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    cookies: Cookies,
    Json(fields): Json<SignupFields>,
) -> axum::response::Response {
    match services.auth().signup(fields).await {
        Ok((user, token)) => {
            cookies.add(session_cookie(token.as_str()));
            errors::success(StatusCode::CREATED, dto::auth_payload(Some(&user)))
        }
        Err(e) => errors::failure(ActionError::from(e)),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    cookies: Cookies,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.auth().login(&body.email, &body.password).await {
        Ok((user, token)) => {
            cookies.add(session_cookie(token.as_str()));
            errors::success(StatusCode::OK, dto::auth_payload(Some(&user)))
        }
        Err(e) => errors::failure(ActionError::from(e)),
    }
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<RequestToken>,
    cookies: Cookies,
) -> axum::response::Response {
    if let Some(token) = token.as_deref() {
        if let Err(e) = services.auth().logout(&SessionToken::from(token)).await {
            return errors::failure(ActionError::from(e));
        }
    }
    cookies.remove(session_cookie(""));
    errors::success(StatusCode::OK, dto::auth_payload(None))
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<RequestToken>,
) -> axum::response::Response {
    match services.auth().check(token.as_deref()).await {
        Ok(user) => errors::success(StatusCode::OK, dto::auth_payload(user.as_ref())),
        Err(e) => errors::failure(ActionError::from(e)),
    }
}
