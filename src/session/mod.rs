//! Auth session state and its client-local persistence.

pub mod store;

pub use store::{LocalStore, SessionStore, TOKEN_KEY, USER_KEY};
