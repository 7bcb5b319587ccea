//! Application context: the shared services every flow depends on.
//!
//! Built exactly once at startup and passed by reference (or `Arc`) from
//! there, so the dependency graph is explicit.  There is no global
//! singleton; tests assemble their own context with doubles.

use crate::api::{AuthApi, HttpAuthApi};
use crate::config::Config;
use crate::session::{LocalStore, SessionStore};
use crate::wallet::{LinkOpener, PairingSdk, WalletConnection, WalletSdkAdapter};
use std::sync::Arc;

pub struct AppContext {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: Arc<dyn AuthApi>,
    pub wallet: Arc<WalletConnection>,
}

impl AppContext {
    /// Assemble the context from a config plus the host-supplied wallet
    /// transport and link opener, then start the wallet eagerly.
    ///
    /// Wallet startup is best-effort: init failures are logged inside the
    /// connection task and leave wallet sign-in unavailable while the rest
    /// of the app keeps working.
    pub fn build(
        config: Config,
        sdk: Arc<dyn PairingSdk>,
        opener: Arc<dyn LinkOpener>,
    ) -> anyhow::Result<Self> {
        let local = LocalStore::open(&config.session_db_path())?;
        let session = Arc::new(SessionStore::new(local));

        let api: Arc<dyn AuthApi> = Arc::new(HttpAuthApi::new(&config.api_base_url)?);

        let adapter = Arc::new(WalletSdkAdapter::new(sdk));
        let wallet = Arc::new(WalletConnection::new(adapter, opener));
        wallet.start();

        Ok(Self {
            config,
            session,
            api,
            wallet,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────
