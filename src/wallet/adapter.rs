//! Shared wallet-SDK adapter.
//!
//! Guarantees a single pairing-SDK handle per [`AppContext`], with
//! idempotent initialization and an awaitable init signal.  The transport's
//! `init` runs in a background task; its outcome is published on a watch
//! channel so any number of consumers can await readiness.
//!
//! Initialization is best-effort by design: `AppContext` kicks it off
//! eagerly and swallows (logs) failures, so consumers must treat wallet
//! features as possibly unavailable rather than assume init succeeded.
//!
//! [`AppContext`]: crate::context::AppContext

use super::sdk::{PairingSdk, PairingSdkEvent};
use super::WalletError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Progress of the one-time SDK setup.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InitStatus {
    Pending,
    Ready,
    Failed(String),
}

/// One shared pairing-SDK handle with idempotent initialization.
pub struct WalletSdkAdapter {
    sdk: Arc<dyn PairingSdk>,
    status_tx: watch::Sender<InitStatus>,
    started: AtomicBool,
}

impl WalletSdkAdapter {
    pub fn new(sdk: Arc<dyn PairingSdk>) -> Self {
        let (status_tx, _) = watch::channel(InitStatus::Pending);
        Self {
            sdk,
            status_tx,
            started: AtomicBool::new(false),
        }
    }

    /// Kick off the SDK's one-time setup.  Idempotent: the first call
    /// spawns the init task, every later call is a no-op.
    pub fn initialize(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let sdk = Arc::clone(&self.sdk);
        let status_tx = self.status_tx.clone();
        tokio::spawn(async move {
            match sdk.init().await {
                Ok(()) => {
                    tracing::debug!("wallet SDK initialized");
                    status_tx.send_replace(InitStatus::Ready);
                }
                Err(e) => {
                    tracing::warn!("wallet SDK init failed: {e}");
                    status_tx.send_replace(InitStatus::Failed(e.to_string()));
                }
            }
        });
    }

    /// The shared SDK handle.  Errors if [`initialize`](Self::initialize)
    /// was never called.
    pub fn sdk(&self) -> Result<Arc<dyn PairingSdk>, WalletError> {
        if !self.started.load(Ordering::SeqCst) {
            return Err(WalletError::Uninitialized);
        }
        Ok(Arc::clone(&self.sdk))
    }

    /// Await completion of the SDK setup.
    ///
    /// Resolves once init finishes; errors with `Uninitialized` if init was
    /// never started, or `InitFailed` if the transport's setup failed.
    pub async fn wait_ready(&self) -> Result<(), WalletError> {
        if !self.started.load(Ordering::SeqCst) {
            return Err(WalletError::Uninitialized);
        }
        let mut rx = self.status_tx.subscribe();
        loop {
            match rx.borrow_and_update().clone() {
                InitStatus::Ready => return Ok(()),
                InitStatus::Failed(msg) => return Err(WalletError::InitFailed(msg)),
                InitStatus::Pending => {}
            }
            if rx.changed().await.is_err() {
                // Sender lives as long as the adapter; closure means the
                // adapter itself is gone.
                return Err(WalletError::Uninitialized);
            }
        }
    }

    /// Currently paired account ids in string form.  Empty when the adapter
    /// was never initialized.
    pub fn connected_account_ids(&self) -> Vec<String> {
        if !self.started.load(Ordering::SeqCst) {
            return Vec::new();
        }
        self.sdk.connected_account_ids()
    }

    /// Subscribe to transport events.  Allowed before initialization so the
    /// connection loop never misses an early pairing event.
    pub fn subscribe_events(&self) -> mpsc::UnboundedReceiver<PairingSdkEvent> {
        self.sdk.subscribe()
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::sdk::testing::FakePairingSdk;

    #[tokio::test]
    async fn uninitialized_adapter_errors() {
        let adapter = WalletSdkAdapter::new(Arc::new(FakePairingSdk::new()));
        assert!(matches!(adapter.sdk(), Err(WalletError::Uninitialized)));
        assert!(matches!(
            adapter.wait_ready().await,
            Err(WalletError::Uninitialized)
        ));
    }

    #[tokio::test]
    async fn uninitialized_account_list_is_empty() {
        let fake = Arc::new(FakePairingSdk::new());
        fake.set_accounts(&["0.0.42"]);
        let adapter = WalletSdkAdapter::new(fake);
        assert!(adapter.connected_account_ids().is_empty());
    }

    #[tokio::test]
    async fn initialize_then_ready() {
        let fake = Arc::new(FakePairingSdk::new());
        fake.set_accounts(&["0.0.42", "0.0.43"]);
        let adapter = WalletSdkAdapter::new(fake);

        adapter.initialize();
        adapter.wait_ready().await.unwrap();

        assert_eq!(adapter.connected_account_ids(), vec!["0.0.42", "0.0.43"]);
        assert!(adapter.sdk().is_ok());
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let adapter = WalletSdkAdapter::new(Arc::new(FakePairingSdk::new()));
        adapter.initialize();
        adapter.initialize();
        adapter.initialize();
        adapter.wait_ready().await.unwrap();
    }

    #[tokio::test]
    async fn failed_init_surfaces_in_wait_ready() {
        let fake = Arc::new(FakePairingSdk::new());
        fake.fail_init_with("relay unreachable");
        let adapter = WalletSdkAdapter::new(fake);

        adapter.initialize();
        match adapter.wait_ready().await {
            Err(WalletError::InitFailed(msg)) => assert!(msg.contains("relay unreachable")),
            other => panic!("expected InitFailed, got {other:?}"),
        }
    }
}
