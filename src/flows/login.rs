//! Login flow controller.
//!
//! Two sign-in paths share this controller:
//! - email/password form submission (`submit`), and
//! - wallet sign-in (`sign_in_with_wallet` plus the auto-login task).
//!
//! The auto-login task is what completes a mobile deep-link round trip: the
//! pairing finishes long after the button press, so the controller
//! subscribes to the pairing transition stream and calls the backend with
//! the account id whenever a `Paired` transition arrives.  Deliberately no
//! dedup: every transition triggers a call (at-least-once), and the
//! backend treats repeated links of the same account as idempotent.

use super::{Destination, FlowError, WalletSignIn};
use crate::api::{ApiError, AuthApi, LoginRequest};
use crate::session::SessionStore;
use crate::wallet::{ClientEnv, ConnectOutcome, PairingTransition, WalletConnection};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub struct LoginFlow {
    api: Arc<dyn AuthApi>,
    session: Arc<SessionStore>,
}

impl LoginFlow {
    pub fn new(api: Arc<dyn AuthApi>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Email/password submission: authenticate, persist the token, fetch
    /// and persist the profile, then head to the dashboard.
    pub async fn submit(&self, email: &str, password: &str) -> Result<Destination, FlowError> {
        let req = LoginRequest {
            email: email.trim().to_lowercase(),
            password: password.to_string(),
        };
        let resp = self.api.login(&req).await?;
        let token = resp.bearer_token().ok_or(ApiError::MissingToken)?;
        self.session.set_token(Some(token));

        let profile = self.api.fetch_profile(token).await?;
        self.session.set_user(Some(profile));

        Ok(Destination::Dashboard)
    }

    /// Wallet sign-in button: with an existing pairing, call the backend
    /// now; otherwise start the pairing flow and return immediately; the
    /// auto-login task picks up the `Paired` transition later.
    pub async fn sign_in_with_wallet(
        &self,
        wallet: &WalletConnection,
        env: &ClientEnv,
    ) -> Result<WalletSignIn, FlowError> {
        let state = wallet.state();
        if state.is_connected() {
            if let Some(account_id) = state.account_id {
                let dest = self.sign_in_with_account(&account_id).await?;
                return Ok(WalletSignIn::Completed(dest));
            }
        }
        match wallet.connect(env).await? {
            ConnectOutcome::StoreRedirect(url) => Ok(WalletSignIn::StoreRedirect(url)),
            ConnectOutcome::PairingOpened => Ok(WalletSignIn::PairingStarted),
        }
    }

    /// `POST /login-hedera/` with a paired account id; persists whatever
    /// token/user the backend returns.
    pub async fn sign_in_with_account(&self, account_id: &str) -> Result<Destination, FlowError> {
        let resp = self.api.login_hedera(account_id).await?;
        if let Some(token) = resp.token.as_deref() {
            self.session.set_token(Some(token));
        }
        if let Some(user) = resp.user {
            self.session.set_user(Some(user));
        }
        Ok(Destination::Dashboard)
    }

    /// Spawn the wallet auto-login task: every `Paired` transition triggers
    /// a backend sign-in with that account id.  Errors are logged and the
    /// task keeps listening; it ends when the connection is dropped.
    pub fn spawn_wallet_autologin(self: &Arc<Self>, wallet: &WalletConnection) -> JoinHandle<()> {
        let mut transitions = wallet.transitions();
        let flow = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match transitions.recv().await {
                    Ok(PairingTransition::Paired { account_id }) => {
                        tracing::info!(account_id = %account_id, "wallet paired; signing in");
                        if let Err(e) = flow.sign_in_with_account(&account_id).await {
                            tracing::warn!("wallet auto sign-in failed: {e}");
                        }
                    }
                    Ok(PairingTransition::Disconnected) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("auto-login missed {n} pairing transitions");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────
