//! Hedera wallet pairing: availability detection, the pairing-SDK boundary,
//! the shared session adapter, and the connection state machine.
//!
//! Layering, bottom up:
//! - [`detect`]: pure environment classification (no I/O)
//! - [`sdk`]: the `PairingSdk` trait a transport implements
//! - [`adapter`]: one shared SDK handle with idempotent initialization
//! - [`connection`]: the `Idle → Connecting → Paired → Disconnected`
//!   state machine consuming SDK events

pub mod adapter;
pub mod connection;
pub mod detect;
pub mod sdk;

pub use adapter::WalletSdkAdapter;
pub use connection::{
    ConnectOutcome, PairingPhase, PairingTransition, WalletConnection, WalletPairingState,
};
pub use detect::{detect as detect_availability, ClientEnv, WalletAvailability};
pub use sdk::{NullPairingSdk, PairingSdk, PairingSdkEvent};

/// Wallet and environment errors: initialization and pairing failures.
/// Callers surface these as form-level error text.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// The adapter was used before `initialize()` was ever called.
    #[error("wallet SDK not initialized; call initialize() first")]
    Uninitialized,

    /// The SDK's one-time setup failed.
    #[error("wallet SDK initialization failed: {0}")]
    InitFailed(String),

    /// A transport operation (pairing modal, disconnect) failed.
    #[error("wallet SDK error: {0}")]
    Sdk(String),
}

/// Hands a URL to the host to open (browser navigation, new tab, `xdg-open`).
///
/// Injected so the connect flow's store redirect is observable in tests and
/// host-appropriate in production.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> anyhow::Result<()>;
}

/// Opener that only logs the URL, suitable for headless hosts.
pub struct LoggingLinkOpener;

impl LinkOpener for LoggingLinkOpener {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        tracing::info!(url = url, "open link");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::LinkOpener;
    use parking_lot::Mutex;

    /// Records every URL it is asked to open.
    #[derive(Default)]
    pub struct RecordingOpener {
        urls: Mutex<Vec<String>>,
    }

    impl RecordingOpener {
        pub fn opened(&self) -> Vec<String> {
            self.urls.lock().clone()
        }
    }

    impl LinkOpener for RecordingOpener {
        fn open(&self, url: &str) -> anyhow::Result<()> {
            self.urls.lock().push(url.to_string());
            Ok(())
        }
    }
}
