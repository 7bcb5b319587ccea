//! HTTP client for the auth API.
//!
//! One [`AuthApi`] method per endpoint, all JSON both ways, against a
//! configured base URL.  Non-2xx responses surface the body's `message`
//! field when present, otherwise a per-operation fallback string; nothing
//! is retried automatically.

use super::types::{
    ApiErrorBody, AuthResponse, HederaLinkRequest, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};
use super::ApiError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Request timeout for all API calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The auth API surface, one method per endpoint.
///
/// A trait so flow controllers can be tested against doubles without a
/// network.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /login/` with email + password.
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// `GET /profile/` with Bearer auth; the profile object is returned
    /// verbatim for storage.
    async fn fetch_profile(&self, token: &str) -> Result<serde_json::Value, ApiError>;

    /// `POST /register/`.
    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ApiError>;

    /// `POST /login-hedera/` with a paired account id.
    async fn login_hedera(&self, account_id: &str) -> Result<AuthResponse, ApiError>;

    /// `POST /connect-hedera/` with a paired account id.
    async fn connect_hedera(&self, account_id: &str) -> Result<AuthResponse, ApiError>;
}

/// Reqwest-backed [`AuthApi`] implementation.
pub struct HttpAuthApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAuthApi {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build the URL for an endpoint path (paths keep their trailing slash,
    /// matching the deployed API's routing).
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let resp = self.http.post(self.endpoint(path)).json(body).send().await?;
        Self::decode(resp, fallback).await
    }

    /// Decode a response: non-2xx becomes `Status` with the body's
    /// `message` (or the fallback); a 2xx body that does not parse as `T`
    /// becomes `InvalidResponse`.
    async fn decode<T: DeserializeOwned>(
        resp: reqwest::Response,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| fallback.to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.post_json("login/", req, "Login failed").await
    }

    async fn fetch_profile(&self, token: &str) -> Result<serde_json::Value, ApiError> {
        let resp = self
            .http
            .get(self.endpoint("profile/"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(resp, "Failed to load profile").await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        self.post_json("register/", req, "Register failed").await
    }

    async fn login_hedera(&self, account_id: &str) -> Result<AuthResponse, ApiError> {
        let body = HederaLinkRequest {
            hedera_account_id: account_id.to_string(),
        };
        self.post_json("login-hedera/", &body, "Hedera login failed")
            .await
    }

    async fn connect_hedera(&self, account_id: &str) -> Result<AuthResponse, ApiError> {
        let body = HederaLinkRequest {
            hedera_account_id: account_id.to_string(),
        };
        self.post_json("connect-hedera/", &body, "Failed to save Hedera account")
            .await
    }
}

// ── Tests ────────────────────────────────────────────────────────
