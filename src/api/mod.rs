//! Remote auth API: typed endpoint schemas and the HTTP client.

pub mod client;
pub mod types;

pub use client::{AuthApi, HttpAuthApi};
pub use types::{
    AuthResponse, HederaLinkRequest, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};

/// API errors, surfaced to the user as human-readable form-level text.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network-level failure (DNS, TLS, timeout, connection reset).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; `message` comes from the body when it has one.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body did not match the endpoint's schema.
    #[error("unexpected response from server: {0}")]
    InvalidResponse(String),

    /// A success response that should have carried a token but did not.
    #[error("No token from server")]
    MissingToken,
}
