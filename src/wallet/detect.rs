//! Wallet availability detection.
//!
//! Classifies the client environment before a pairing attempt: is a wallet
//! extension injected (desktop), is this a mobile browser that can hand off
//! to a wallet app, or is no wallet reachable at all?  Pure classification:
//! no I/O, no side effects; recomputed per connect attempt and never stored.
//!
//! ## Policy
//! - Any known injected wallet global ⇒ `Desktop`
//! - Android/iOS user-agent **and** the wallet mobile meta tag ⇒ `Mobile`
//! - Everything else ⇒ `Unavailable` (callers redirect to an app store /
//!   download page instead of opening the pairing modal)

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Wallet globals injected into the page by known desktop extensions.
const INJECTED_WALLET_GLOBALS: &[&str] = &["hedera", "hashpack", "hashconnect"];

/// Play Store listing for the HashPack wallet app (Android redirect target).
pub const PLAY_STORE_URL: &str =
    "https://play.google.com/store/apps/details?id=app.hashpack.wallet";

/// App Store listing for the HashPack wallet app (iOS redirect target).
pub const APP_STORE_URL: &str = "https://apps.apple.com/app/hashpack-wallet/id1608827031";

/// Wallet download page (desktop fallback, opened in a new tab).
pub const WALLET_DOWNLOAD_URL: &str = "https://www.hashpack.app/download";

static ANDROID_UA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)android").unwrap());
static IOS_UA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"iPad|iPhone|iPod").unwrap());

// ── Client environment snapshot ──────────────────────────────────

/// Immutable snapshot of the client environment a connect attempt runs in.
///
/// Captured once per attempt by the embedder (browser shell, mobile
/// webview, CLI) and handed to [`detect`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientEnv {
    /// The navigator user-agent string ("" when unknown).
    pub user_agent: String,
    /// Names of wallet globals injected into the page, if any.
    pub injected_globals: Vec<String>,
    /// Whether the wallet mobile meta tag is present in the document.
    pub has_mobile_meta: bool,
}

impl ClientEnv {
    /// Environment for a native (non-browser) host such as the CLI:
    /// no injected globals, no mobile meta tag.
    pub fn native() -> Self {
        Self {
            user_agent: format!(
                "hederair/{} ({})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ),
            injected_globals: Vec::new(),
            has_mobile_meta: false,
        }
    }

    /// True when the user-agent looks like an Android device.
    pub fn is_android(&self) -> bool {
        ANDROID_UA.is_match(&self.user_agent)
    }

    /// True when the user-agent looks like an iOS device.
    pub fn is_ios(&self) -> bool {
        IOS_UA.is_match(&self.user_agent)
    }

    fn has_injected_wallet(&self) -> bool {
        self.injected_globals
            .iter()
            .any(|g| INJECTED_WALLET_GLOBALS.contains(&g.as_str()))
    }
}

// ── Availability ─────────────────────────────────────────────────

/// Result of classifying the client environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletAvailability {
    /// A wallet extension is injected into the page.
    Desktop,
    /// Mobile browser that can deep-link into a wallet app.
    Mobile,
    /// No wallet reachable; redirect to an install page instead.
    Unavailable,
}

/// Classify wallet availability for the given environment.
///
/// Deterministic and side-effect free.  The mobile branch requires the
/// wallet meta tag: a mobile user-agent alone is not enough to know a
/// wallet app is installed, so those clients are sent to the store.
pub fn detect(env: &ClientEnv) -> WalletAvailability {
    if env.has_injected_wallet() {
        return WalletAvailability::Desktop;
    }
    if (env.is_android() || env.is_ios()) && env.has_mobile_meta {
        return WalletAvailability::Mobile;
    }
    WalletAvailability::Unavailable
}

/// The install link to send a wallet-less client to: store listing on
/// mobile, download page everywhere else.
pub fn install_link(env: &ClientEnv) -> &'static str {
    if env.is_android() {
        PLAY_STORE_URL
    } else if env.is_ios() {
        APP_STORE_URL
    } else {
        WALLET_DOWNLOAD_URL
    }
}

// ── Tests ────────────────────────────────────────────────────────
