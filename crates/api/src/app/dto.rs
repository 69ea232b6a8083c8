//! Request payloads and response mapping helpers.
//!
//! Product and category bodies deserialize directly into the catalog's
//! draft/patch types; only shapes with no domain counterpart live here.

use serde::Deserialize;
use serde_json::json;

use bazaar_auth::User;
use bazaar_catalog::ProductStatus;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ProductStatus,
}

/// `?limit=` for product listings; absent means unbounded.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Body shared by the auth endpoints: the resolved user, or `null` when the
/// request ends up anonymous.
pub fn auth_payload(user: Option<&User>) -> serde_json::Value {
    json!({ "user": user })
}
