//! Transport behind the session controller.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use bazaar_actions::Outcome;
use bazaar_auth::{SignupFields, User};

use crate::error::ClientError;

/// Auth calls the controller needs from the server.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<User, ClientError>;
    async fn signup(&self, fields: &SignupFields) -> Result<User, ClientError>;
    async fn logout(&self) -> Result<(), ClientError>;
    /// Resolve the current session; `None` is the anonymous answer, not an
    /// error.
    async fn check(&self) -> Result<Option<User>, ClientError>;
}

/// Body shape shared by the auth endpoints.
#[derive(Debug, Deserialize)]
struct AuthPayload {
    user: Option<User>,
}

/// [`AuthGateway`] over HTTP.
///
/// Keeps one cookie jar for the process, so the `bazaar_session` cookie set
/// at login rides along on every later call.
pub struct HttpAuthGateway {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAuthGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn post(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Option<User>, ClientError> {
        let mut req = self.http.post(format!("{}{path}", self.base_url));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        decode(res).await
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let user = self
            .post(
                "/api/auth/login",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        user.ok_or_else(|| ClientError::Protocol("login answered without a user".to_string()))
    }

    async fn signup(&self, fields: &SignupFields) -> Result<User, ClientError> {
        let user = self
            .post(
                "/api/auth/signup",
                Some(json!({
                    "email": fields.email,
                    "password": fields.password,
                    "name": fields.name,
                })),
            )
            .await?;
        user.ok_or_else(|| ClientError::Protocol("signup answered without a user".to_string()))
    }

    async fn logout(&self) -> Result<(), ClientError> {
        self.post("/api/auth/logout", None).await?;
        Ok(())
    }

    async fn check(&self) -> Result<Option<User>, ClientError> {
        let res = self
            .http
            .get(format!("{}/api/auth/me", self.base_url))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        decode(res).await
    }
}

/// Unpack the outcome envelope; server-side failures keep their kind.
async fn decode(res: reqwest::Response) -> Result<Option<User>, ClientError> {
    let outcome: Outcome<AuthPayload> = res
        .json()
        .await
        .map_err(|e| ClientError::Protocol(e.to_string()))?;

    match outcome {
        Outcome::Success(payload) => Ok(payload.user),
        Outcome::Failure(err) => Err(ClientError::Action(err)),
    }
}
