//! Typed request/response schemas for the auth API.
//!
//! Every endpoint gets an explicit serde schema; unknown response fields
//! are tolerated, but a body that fails to parse at all is reported as
//! [`ApiError::InvalidResponse`](super::ApiError::InvalidResponse) rather
//! than silently treated as empty.

use serde::{Deserialize, Serialize};

/// Body for `POST /login/`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /login/`.  The deployment has answered with either
/// `token` or `access_token` over time; both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub access_token: Option<String>,
}

impl LoginResponse {
    /// The bearer token, whichever field carried it.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().or(self.access_token.as_deref())
    }
}

/// Body for `POST /register/`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Fixed to `"student"` by the registration flow.
    pub role: String,
}

/// Response of `POST /register/`.  `user` and `token` are both optional;
/// some deployments return only an `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub token: Option<String>,
    pub user: Option<serde_json::Value>,
    pub id: Option<serde_json::Value>,
}

/// Body for `POST /login-hedera/` and `POST /connect-hedera/`.
#[derive(Debug, Clone, Serialize)]
pub struct HederaLinkRequest {
    pub hedera_account_id: String,
}

/// Response of the hedera link endpoints: token and user are each optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    pub token: Option<String>,
    pub user: Option<serde_json::Value>,
}

/// Error body shape the API uses for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}
