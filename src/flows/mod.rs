//! Login/registration flow controllers.
//!
//! Controllers orchestrate one submission each: validate locally, call the
//! remote API, persist session state, and report where the UI should go
//! next.  Navigation itself stays with the host; controllers only return a
//! [`Destination`].  All failure paths are recoverable; errors propagate
//! as [`FlowError`] and no loading state can stick.

pub mod login;
pub mod register;

pub use login::LoginFlow;
pub use register::{RegisterFlow, RegistrationForm};

use crate::api::ApiError;
use crate::wallet::WalletError;

/// Where the UI goes after a successful flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Dashboard,
    Success,
}

impl Destination {
    /// The route string the host's router understands.
    pub fn route(&self) -> &'static str {
        match self {
            Destination::Dashboard => "/dashboard",
            Destination::Success => "/success",
        }
    }
}

/// Result of a wallet sign-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletSignIn {
    /// A pairing already existed; the backend call ran to completion.
    Completed(Destination),
    /// The pairing modal flow was started; sign-in continues via the
    /// pairing transition stream once the wallet approves.
    PairingStarted,
    /// No wallet available; the client was sent to an install page.
    StoreRedirect(String),
}

/// Everything a flow can fail with, rendered as form-level error text.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Local validation failed; no network call was made.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

// ── Test doubles ─────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_support {
    use crate::api::types::*;
    use crate::api::{ApiError, AuthApi};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned [`AuthApi`] that counts calls and records linked account ids.
    #[derive(Default)]
    pub struct MockApi {
        pub login_calls: AtomicUsize,
        pub profile_calls: AtomicUsize,
        pub register_calls: AtomicUsize,
        pub login_hedera_calls: AtomicUsize,
        pub connect_hedera_calls: AtomicUsize,
        pub linked_accounts: Mutex<Vec<String>>,
    }

    impl MockApi {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl AuthApi for MockApi {
        async fn login(&self, _req: &LoginRequest) -> Result<LoginResponse, ApiError> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            Ok(LoginResponse {
                token: Some("T".into()),
                access_token: None,
            })
        }

        async fn fetch_profile(&self, _token: &str) -> Result<serde_json::Value, ApiError> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({"id": 1, "name": "A"}))
        }

        async fn register(&self, _req: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            Ok(RegisterResponse {
                token: Some("RT".into()),
                user: None,
                id: Some(serde_json::json!(5)),
            })
        }

        async fn login_hedera(&self, account_id: &str) -> Result<AuthResponse, ApiError> {
            self.login_hedera_calls.fetch_add(1, Ordering::SeqCst);
            self.linked_accounts.lock().push(account_id.to_string());
            Ok(AuthResponse {
                token: Some("HT".into()),
                user: Some(serde_json::json!({"id": 2})),
            })
        }

        async fn connect_hedera(&self, account_id: &str) -> Result<AuthResponse, ApiError> {
            self.connect_hedera_calls.fetch_add(1, Ordering::SeqCst);
            self.linked_accounts.lock().push(account_id.to_string());
            Ok(AuthResponse {
                token: Some("HT".into()),
                user: Some(serde_json::json!({"id": 2})),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_routes() {
        assert_eq!(Destination::Dashboard.route(), "/dashboard");
        assert_eq!(Destination::Success.route(), "/success");
    }

    #[test]
    fn validation_error_displays_message_only() {
        let err = FlowError::Validation("Passwords do not match".into());
        assert_eq!(err.to_string(), "Passwords do not match");
    }
}
