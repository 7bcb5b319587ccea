//! Pairing-SDK boundary.
//!
//! The wallet handshake itself (relay transport, QR codes, deep links) is a
//! third-party concern.  This module defines the trait the rest of the crate
//! programs against, the events a transport must deliver, and a null
//! transport for builds with no wallet bridge wired in.  Embedders supply a
//! real implementation; tests supply a scriptable fake.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

// ── Events ───────────────────────────────────────────────────────

/// Events a pairing transport delivers to its subscribers.
#[derive(Debug, Clone)]
pub enum PairingSdkEvent {
    /// A wallet approved the pairing.  Carries the transport's opaque
    /// pairing payload (wallet metadata, topic, network).
    PairingCompleted { pairing: serde_json::Value },
    /// The wallet ended the pairing.
    Disconnected,
    /// Transport-level connection status changed (relay up/down etc.).
    ConnectionStatusChanged { status: String },
}

// ── Trait ────────────────────────────────────────────────────────

/// The wallet pairing transport.
///
/// One instance lives for the process lifetime, owned by
/// [`WalletSdkAdapter`](super::adapter::WalletSdkAdapter).  All methods are
/// callable from any task; `subscribe` may be called before `init`.
#[async_trait]
pub trait PairingSdk: Send + Sync {
    /// One-time transport setup (relay connection, session restore).
    async fn init(&self) -> anyhow::Result<()>;

    /// Present the pairing UI (extension popup, QR modal, deep link).
    ///
    /// Resolves when the modal flow ends, which may be never if the user
    /// abandons it.  A completed pairing is reported separately via
    /// [`PairingSdkEvent::PairingCompleted`].
    async fn open_pairing_modal(&self) -> anyhow::Result<()>;

    /// Tear down the active pairing.
    async fn disconnect(&self) -> anyhow::Result<()>;

    /// Account ids of currently paired wallets, in the transport's order.
    fn connected_account_ids(&self) -> Vec<String>;

    /// Register a new event subscriber.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<PairingSdkEvent>;
}

// ── Null transport ───────────────────────────────────────────────

/// Placeholder transport for hosts without a wallet bridge (e.g. the CLI).
///
/// Initializes cleanly, reports no paired accounts, and fails pairing
/// attempts with a clear error instead of hanging.
#[derive(Default)]
pub struct NullPairingSdk {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<PairingSdkEvent>>>,
}

impl NullPairingSdk {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PairingSdk for NullPairingSdk {
    async fn init(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn open_pairing_modal(&self) -> anyhow::Result<()> {
        anyhow::bail!("no wallet pairing transport is configured for this host")
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn connected_account_ids(&self) -> Vec<String> {
        Vec::new()
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<PairingSdkEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Keep the sender alive so the receiver stays open (and silent).
        self.subscribers.lock().push(tx);
        rx
    }
}

// ── Test transport ───────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_sdk_initializes_and_reports_no_accounts() {
        let sdk = NullPairingSdk::new();
        assert!(sdk.init().await.is_ok());
        assert!(sdk.connected_account_ids().is_empty());
    }

    #[tokio::test]
    async fn null_sdk_rejects_pairing() {
        let sdk = NullPairingSdk::new();
        let err = sdk.open_pairing_modal().await.unwrap_err();
        assert!(err.to_string().contains("no wallet pairing transport"));
    }

    #[tokio::test]
    async fn fake_sdk_delivers_events_to_all_subscribers() {
        let sdk = testing::FakePairingSdk::new();
        let mut rx1 = sdk.subscribe();
        let mut rx2 = sdk.subscribe();

        sdk.complete_pairing(&["0.0.1234"], serde_json::json!({"topic": "t"}));

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await {
                Some(PairingSdkEvent::PairingCompleted { pairing }) => {
                    assert_eq!(pairing["topic"], "t");
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }
}
