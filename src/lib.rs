//! Authentication client for the HederaAir API.
//!
//! Two sign-in paths against a remote HTTP API: classic email/password and
//! Hedera wallet pairing.  The crate is host-agnostic; a browser shell,
//! mobile webview, or the bundled CLI supplies the wallet transport
//! ([`wallet::PairingSdk`]) and link opener, and everything else is wired
//! through one [`context::AppContext`].

pub mod api;
pub mod config;
pub mod context;
pub mod flows;
pub mod session;
pub mod wallet;

pub use config::Config;
pub use context::AppContext;
