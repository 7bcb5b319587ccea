//! Registration flow controller.
//!
//! Validates the form locally before anything touches the network, then
//! registers, persists whatever session the backend hands back, and routes
//! to the success page.  The wallet path here links an account via
//! `POST /connect-hedera/`; unlike login there is no background auto-link
//! task, pairing completion only matters while the user is on this form.

use super::{Destination, FlowError, WalletSignIn};
use crate::api::{AuthApi, RegisterRequest};
use crate::session::SessionStore;
use crate::wallet::{ClientEnv, ConnectOutcome, WalletConnection};
use serde_json::json;
use std::sync::Arc;

/// Role sent with every registration.
const DEFAULT_ROLE: &str = "student";

/// Minimum password length accepted by the form.
const MIN_PASSWORD_LEN: usize = 8;

/// Raw form fields as the user typed them.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accepted_terms: bool,
}

impl RegistrationForm {
    /// Fail-fast validation, first broken rule wins.  The message strings
    /// are shown verbatim as form-level error text.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.username.trim().is_empty() {
            return Err(FlowError::Validation("Please enter username".into()));
        }
        if self.email.trim().is_empty() {
            return Err(FlowError::Validation("Please enter email".into()));
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(FlowError::Validation(
                "Password must be at least 8 chars".into(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(FlowError::Validation("Passwords do not match".into()));
        }
        if !self.accepted_terms {
            return Err(FlowError::Validation("Accept terms".into()));
        }
        Ok(())
    }
}

pub struct RegisterFlow {
    api: Arc<dyn AuthApi>,
    session: Arc<SessionStore>,
}

impl RegisterFlow {
    pub fn new(api: Arc<dyn AuthApi>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Validate and submit the form.  On success the session holds the new
    /// token (when the backend returned one) and a user object, either the
    /// backend's or a minimal one assembled from the form.
    pub async fn submit(&self, form: &RegistrationForm) -> Result<Destination, FlowError> {
        form.validate()?;

        let req = RegisterRequest {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_lowercase(),
            password: form.password.clone(),
            role: DEFAULT_ROLE.to_string(),
        };
        let resp = self.api.register(&req).await?;

        if let Some(token) = resp.token.as_deref() {
            self.session.set_token(Some(token));
        }
        let user = resp.user.unwrap_or_else(|| {
            json!({
                "id": resp.id.unwrap_or(serde_json::Value::Null),
                "username": req.username,
                "email": req.email,
            })
        });
        self.session.set_user(Some(user));

        Ok(Destination::Success)
    }

    /// Wallet button on the registration form: with an existing pairing,
    /// link the account now; otherwise kick off pairing.  Pairing that
    /// completes later is picked up by pressing the button again, there is
    /// no background reconciler on this form.
    pub async fn connect_wallet(
        &self,
        wallet: &WalletConnection,
        env: &ClientEnv,
    ) -> Result<WalletSignIn, FlowError> {
        let state = wallet.state();
        if state.is_connected() {
            if let Some(account_id) = state.account_id {
                let dest = self.link_account(&account_id).await?;
                return Ok(WalletSignIn::Completed(dest));
            }
        }
        match wallet.connect(env).await? {
            ConnectOutcome::StoreRedirect(url) => Ok(WalletSignIn::StoreRedirect(url)),
            ConnectOutcome::PairingOpened => Ok(WalletSignIn::PairingStarted),
        }
    }

    /// `POST /connect-hedera/` with a paired account id.
    pub async fn link_account(&self, account_id: &str) -> Result<Destination, FlowError> {
        let resp = self.api.connect_hedera(account_id).await?;
        if let Some(token) = resp.token.as_deref() {
            self.session.set_token(Some(token));
        }
        if let Some(user) = resp.user {
            self.session.set_user(Some(user));
        }
        Ok(Destination::Success)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::test_support::MockApi;
    use crate::session::{LocalStore, TOKEN_KEY};
    use std::sync::atomic::Ordering;

    fn session() -> Arc<SessionStore> {
        Arc::new(SessionStore::new(LocalStore::in_memory().unwrap()))
    }

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "longenough".into(),
            confirm_password: "longenough".into(),
            accepted_terms: true,
        }
    }

    #[test]
    fn validation_order_is_fail_fast() {
        let empty = RegistrationForm::default();
        assert_eq!(
            empty.validate().unwrap_err().to_string(),
            "Please enter username"
        );

        let mut form = valid_form();
        form.email = "  ".into();
        assert_eq!(form.validate().unwrap_err().to_string(), "Please enter email");

        let mut form = valid_form();
        form.password = "short".into();
        form.confirm_password = "short".into();
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Password must be at least 8 chars"
        );

        let mut form = valid_form();
        form.confirm_password = "different1".into();
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Passwords do not match"
        );

        let mut form = valid_form();
        form.accepted_terms = false;
        assert_eq!(form.validate().unwrap_err().to_string(), "Accept terms");

        assert!(valid_form().validate().is_ok());
    }

    #[tokio::test]
    async fn mismatched_passwords_never_reach_the_network() {
        let api = Arc::new(MockApi::new());
        let flow = RegisterFlow::new(Arc::clone(&api) as Arc<dyn AuthApi>, session());

        let mut form = valid_form();
        form.confirm_password = "other-password".into();
        let err = flow.submit(&form).await.unwrap_err();

        assert_eq!(err.to_string(), "Passwords do not match");
        assert_eq!(api.register_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_submit_persists_session_and_routes_to_success() {
        let api = Arc::new(MockApi::new());
        let session = session();
        let flow = RegisterFlow::new(Arc::clone(&api) as Arc<dyn AuthApi>, Arc::clone(&session));

        let dest = flow.submit(&valid_form()).await.unwrap();

        assert_eq!(dest, Destination::Success);
        assert_eq!(api.register_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.persisted(TOKEN_KEY).as_deref(), Some("RT"));
        // MockApi returns no user object, so the fallback is assembled
        // from the form plus the returned id.
        assert_eq!(
            session.user(),
            Some(json!({"id": 5, "username": "ada", "email": "ada@example.com"}))
        );
    }

    #[tokio::test]
    async fn email_is_normalized_before_submit() {
        let api = Arc::new(MockApi::new());
        let session = session();
        let flow = RegisterFlow::new(Arc::clone(&api) as Arc<dyn AuthApi>, Arc::clone(&session));

        let mut form = valid_form();
        form.email = "  Ada@Example.COM ".into();
        form.username = "  ada  ".into();
        flow.submit(&form).await.unwrap();

        assert_eq!(
            session.user(),
            Some(json!({"id": 5, "username": "ada", "email": "ada@example.com"}))
        );
    }

    #[tokio::test]
    async fn link_account_uses_connect_endpoint() {
        let api = Arc::new(MockApi::new());
        let session = session();
        let flow = RegisterFlow::new(Arc::clone(&api) as Arc<dyn AuthApi>, Arc::clone(&session));

        let dest = flow.link_account("0.0.55").await.unwrap();

        assert_eq!(dest, Destination::Success);
        assert_eq!(api.connect_hedera_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.login_hedera_calls.load(Ordering::SeqCst), 0);
        assert_eq!(*api.linked_accounts.lock(), vec!["0.0.55"]);
        assert_eq!(session.token().as_deref(), Some("HT"));
    }
}
