//! Wallet connection state machine.
//!
//! An explicit FSM, `Idle → Connecting → Paired → Disconnected`, driven by
//! transport events consumed from a channel.  Two outputs:
//!
//! - a `watch` channel carrying the full [`WalletPairingState`] snapshot
//!   (what a UI renders), and
//! - a `broadcast` stream of [`PairingTransition`]s, which flow controllers
//!   subscribe to for account reconciliation.
//!
//! There is deliberately no pairing timeout and no cancellation: the modal
//! is user-driven and may suspend indefinitely; an abandoned modal leaves
//! the machine in `Connecting` until a transport event or `disconnect()`
//! moves it on.

use super::adapter::WalletSdkAdapter;
use super::detect::{detect, install_link, ClientEnv, WalletAvailability};
use super::sdk::PairingSdkEvent;
use super::{LinkOpener, WalletError};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Capacity of the transition broadcast; pairing transitions are rare.
const TRANSITION_CHANNEL_CAPACITY: usize = 32;

// ── State ────────────────────────────────────────────────────────

/// Phase of the pairing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingPhase {
    /// No pairing activity.
    Idle,
    /// The pairing modal is (or was) open; waiting on the wallet.
    Connecting,
    /// A wallet is paired and an account id is known.
    Paired,
    /// The wallet ended a previous pairing.
    Disconnected,
}

/// Snapshot of the wallet connection.
///
/// Invariant: `account_id` and `pairing` are populated only in `Paired`,
/// and both reset together when the pairing ends.
#[derive(Debug, Clone)]
pub struct WalletPairingState {
    pub phase: PairingPhase,
    /// Active account id (first of the transport's paired accounts).
    pub account_id: Option<String>,
    /// Opaque transport pairing payload, if one was delivered.
    pub pairing: Option<serde_json::Value>,
}

impl WalletPairingState {
    fn idle() -> Self {
        Self {
            phase: PairingPhase::Idle,
            account_id: None,
            pairing: None,
        }
    }

    /// True when a wallet is paired.
    pub fn is_connected(&self) -> bool {
        self.phase == PairingPhase::Paired
    }

    /// True while the pairing modal flow is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase == PairingPhase::Connecting
    }
}

/// A state-machine transition flow controllers subscribe to.
#[derive(Debug, Clone)]
pub enum PairingTransition {
    /// Entered `Paired` with the given active account.
    Paired { account_id: String },
    /// The pairing ended.
    Disconnected,
}

/// What `connect()` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The pairing modal flow ran (pairing itself completes via events).
    PairingOpened,
    /// No wallet available; the client was sent to an install page.
    StoreRedirect(String),
}

// ── Controller ───────────────────────────────────────────────────

/// Owns the pairing FSM and the transport event loop.
pub struct WalletConnection {
    adapter: Arc<WalletSdkAdapter>,
    opener: Arc<dyn LinkOpener>,
    state_tx: watch::Sender<WalletPairingState>,
    transitions_tx: broadcast::Sender<PairingTransition>,
}

impl WalletConnection {
    pub fn new(adapter: Arc<WalletSdkAdapter>, opener: Arc<dyn LinkOpener>) -> Self {
        let (state_tx, _) = watch::channel(WalletPairingState::idle());
        let (transitions_tx, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        Self {
            adapter,
            opener,
            state_tx,
            transitions_tx,
        }
    }

    /// Start the connection: initialize the adapter, subscribe to transport
    /// events, and drive the FSM from a background task.
    ///
    /// After the init signal resolves the task re-checks already-paired
    /// accounts, so a pairing that survived a page reload (or a mobile
    /// deep-link round trip) is adopted without a new modal flow.  Init
    /// failure is logged and leaves wallet features silently unavailable.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        self.adapter.initialize();
        // Subscribe before spawning so no event can be missed.
        let mut events = self.adapter.subscribe_events();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = this.adapter.wait_ready().await {
                tracing::warn!("wallet unavailable: {e}");
                return;
            }
            let ids = this.adapter.connected_account_ids();
            if !ids.is_empty() {
                this.adopt_paired(ids, None);
            }
            while let Some(event) = events.recv().await {
                this.handle_event(event);
            }
            tracing::debug!("wallet event stream closed");
        })
    }

    fn handle_event(&self, event: PairingSdkEvent) {
        match event {
            PairingSdkEvent::PairingCompleted { pairing } => {
                let ids = self.adapter.connected_account_ids();
                if ids.is_empty() {
                    tracing::debug!("pairing event with no connected accounts; ignoring");
                } else {
                    self.adopt_paired(ids, Some(pairing));
                }
            }
            PairingSdkEvent::Disconnected => self.reset_disconnected(),
            PairingSdkEvent::ConnectionStatusChanged { status } => {
                tracing::debug!(status = %status, "wallet connection status changed");
            }
        }
    }

    /// Enter `Paired`, adopting the first account as the active identity.
    fn adopt_paired(&self, ids: Vec<String>, pairing: Option<serde_json::Value>) {
        let Some(account_id) = ids.into_iter().next() else {
            return;
        };
        tracing::info!(account_id = %account_id, "wallet paired");
        self.state_tx.send_replace(WalletPairingState {
            phase: PairingPhase::Paired,
            account_id: Some(account_id.clone()),
            pairing,
        });
        let _ = self.transitions_tx.send(PairingTransition::Paired { account_id });
    }

    /// Unconditionally clear to `Disconnected`.
    fn reset_disconnected(&self) {
        tracing::info!("wallet disconnected");
        self.state_tx.send_replace(WalletPairingState {
            phase: PairingPhase::Disconnected,
            account_id: None,
            pairing: None,
        });
        let _ = self.transitions_tx.send(PairingTransition::Disconnected);
    }

    /// Attempt to pair a wallet.
    ///
    /// When no wallet is available for this environment, resolves the
    /// platform install link, hands it to the [`LinkOpener`], and returns
    /// without touching the transport.  Otherwise awaits adapter readiness
    /// and runs the modal flow to completion; the state stays `Connecting`
    /// for the whole (possibly indefinite) modal flow.  Modal failures are
    /// logged and re-thrown so the caller can surface them.
    pub async fn connect(&self, env: &ClientEnv) -> Result<ConnectOutcome, WalletError> {
        if detect(env) == WalletAvailability::Unavailable {
            let url = install_link(env);
            tracing::info!(url = url, "no wallet available; redirecting to install page");
            if let Err(e) = self.opener.open(url) {
                tracing::warn!("failed to open install link: {e}");
            }
            return Ok(ConnectOutcome::StoreRedirect(url.to_string()));
        }

        self.adapter.initialize();
        self.adapter.wait_ready().await?;

        self.state_tx.send_modify(|s| {
            if s.phase != PairingPhase::Paired {
                s.phase = PairingPhase::Connecting;
            }
        });

        let result = self.adapter.sdk()?.open_pairing_modal().await;

        // The modal flow is over; if no pairing event landed, settle back.
        self.state_tx.send_modify(|s| {
            if s.phase == PairingPhase::Connecting {
                s.phase = PairingPhase::Idle;
            }
        });

        match result {
            Ok(()) => Ok(ConnectOutcome::PairingOpened),
            Err(e) => {
                tracing::error!("pairing modal failed: {e}");
                Err(WalletError::Sdk(e.to_string()))
            }
        }
    }

    /// Tear down the active pairing.  No-op when the adapter was never
    /// initialized; transport errors are logged, never re-thrown, and the
    /// local state is reset regardless.
    pub async fn disconnect(&self) {
        let Ok(sdk) = self.adapter.sdk() else {
            return;
        };
        if let Err(e) = sdk.disconnect().await {
            tracing::warn!("wallet disconnect failed: {e}");
        }
        self.reset_disconnected();
    }

    /// Current state snapshot.
    pub fn state(&self) -> WalletPairingState {
        self.state_tx.borrow().clone()
    }

    /// Observe state changes (UI rendering).
    pub fn watch_state(&self) -> watch::Receiver<WalletPairingState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to the formal transition stream (reconciliation path).
    pub fn transitions(&self) -> broadcast::Receiver<PairingTransition> {
        self.transitions_tx.subscribe()
    }
}

// ── Tests ────────────────────────────────────────────────────────
