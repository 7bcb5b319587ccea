//! Client-local session storage.
//!
//! Two layers:
//! - [`LocalStore`]: a small SQLite-backed key/value store standing in for
//!   the browser's client-local storage.  Keys are independent strings;
//!   [`LocalStore::remove_many`] removes a set of keys in one transaction.
//! - [`SessionStore`]: the process-wide auth session `{ user, token }`,
//!   hydrated from the local store at construction and kept consistent with
//!   it by a write-through rule: every non-null set writes the key, every
//!   null set removes it.

use parking_lot::{Mutex, RwLock};
use std::path::Path;

/// Storage key for the JSON-serialized profile object.
pub const USER_KEY: &str = "user";

/// Storage key for the raw bearer token string.
pub const TOKEN_KEY: &str = "authToken";

// ── Key/value store ──────────────────────────────────────────────

/// SQLite-backed key/value store for client-local persistence.
pub struct LocalStore {
    conn: Mutex<rusqlite::Connection>,
}

impl LocalStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = rusqlite::Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")?;
        Self::init_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (for tests).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::init_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_tables(conn: &rusqlite::Connection) -> anyhow::Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Read a value, `None` when absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT value FROM storage WHERE key = ?1",
            rusqlite::params![key],
            |row| row.get(0),
        )
        .ok()
    }

    /// Write (or overwrite) a value.
    pub fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO storage (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key if present.
    pub fn remove(&self, key: &str) -> anyhow::Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM storage WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
    }

    /// Remove several keys in a single transaction, so a crash cannot leave
    /// only some of them cleared.
    pub fn remove_many(&self, keys: &[&str]) -> anyhow::Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        for key in keys {
            tx.execute("DELETE FROM storage WHERE key = ?1", rusqlite::params![key])?;
        }
        tx.commit()?;
        Ok(())
    }
}

// ── Session store ────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct SessionState {
    user: Option<serde_json::Value>,
    token: Option<String>,
}

/// Process-wide authenticated-session state with write-through persistence.
///
/// The in-memory copy and the persisted copy are kept consistent by the
/// setters; persistence failures are logged, never surfaced, so auth flows
/// keep working with in-memory state even if the disk is unhappy.
pub struct SessionStore {
    local: LocalStore,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Build the session store, rehydrating from local storage.  Malformed
    /// or absent persisted values hydrate as `None`.
    pub fn new(local: LocalStore) -> Self {
        let user = local
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok());
        let token = local.get(TOKEN_KEY);
        Self {
            local,
            state: RwLock::new(SessionState { user, token }),
        }
    }

    /// The authenticated user's profile object, verbatim as the API sent it.
    pub fn user(&self) -> Option<serde_json::Value> {
        self.state.read().user.clone()
    }

    /// The bearer token for API calls.
    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    /// True when a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.state.read().token.is_some()
    }

    /// Set or clear the user profile, writing through to local storage.
    pub fn set_user(&self, user: Option<serde_json::Value>) {
        let mut state = self.state.write();
        match &user {
            Some(value) => {
                let raw = value.to_string();
                if let Err(e) = self.local.put(USER_KEY, &raw) {
                    tracing::warn!("failed to persist user profile: {e}");
                }
            }
            None => {
                if let Err(e) = self.local.remove(USER_KEY) {
                    tracing::warn!("failed to remove persisted user profile: {e}");
                }
            }
        }
        state.user = user;
    }

    /// Set or clear the bearer token, writing through to local storage.
    pub fn set_token(&self, token: Option<&str>) {
        let mut state = self.state.write();
        match token {
            Some(value) => {
                if let Err(e) = self.local.put(TOKEN_KEY, value) {
                    tracing::warn!("failed to persist auth token: {e}");
                }
            }
            None => {
                if let Err(e) = self.local.remove(TOKEN_KEY) {
                    tracing::warn!("failed to remove persisted auth token: {e}");
                }
            }
        }
        state.token = token.map(|t| t.to_string());
    }

    /// Clear the whole session: both in-memory values and both persisted
    /// keys.  The keys are removed in one storage transaction, so no
    /// partial-logout state is observable afterwards.
    pub fn logout(&self) {
        let mut state = self.state.write();
        if let Err(e) = self.local.remove_many(&[USER_KEY, TOKEN_KEY]) {
            tracing::warn!("failed to clear persisted session: {e}");
        }
        *state = SessionState::default();
        tracing::info!("session cleared");
    }

    /// Raw persisted value, bypassing the in-memory copy (tests, debugging).
    pub fn persisted(&self, key: &str) -> Option<String> {
        self.local.get(key)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> SessionStore {
        SessionStore::new(LocalStore::in_memory().unwrap())
    }

    #[test]
    fn token_writes_through() {
        let s = store();
        s.set_token(Some("abc"));
        assert_eq!(s.token().as_deref(), Some("abc"));
        assert_eq!(s.persisted(TOKEN_KEY).as_deref(), Some("abc"));
    }

    #[test]
    fn clearing_token_removes_key() {
        let s = store();
        s.set_token(Some("abc"));
        s.set_token(None);
        assert!(s.token().is_none());
        assert!(s.persisted(TOKEN_KEY).is_none());
    }

    #[test]
    fn user_round_trips_verbatim() {
        let s = store();
        let profile = serde_json::json!({"id": 1, "name": "A", "extra": {"nested": true}});
        s.set_user(Some(profile.clone()));
        assert_eq!(s.user(), Some(profile.clone()));

        let raw = s.persisted(USER_KEY).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&raw).unwrap(), profile);
    }

    #[test]
    fn logout_clears_both_keys() {
        let s = store();
        s.set_token(Some("tok"));
        s.set_user(Some(serde_json::json!({"id": 7})));

        s.logout();

        assert!(s.token().is_none());
        assert!(s.user().is_none());
        assert!(s.persisted(TOKEN_KEY).is_none());
        assert!(s.persisted(USER_KEY).is_none());
        assert!(!s.is_authenticated());
    }

    #[test]
    fn hydrates_from_existing_storage() {
        let local = LocalStore::in_memory().unwrap();
        local.put(TOKEN_KEY, "persisted-token").unwrap();
        local.put(USER_KEY, r#"{"id": 3}"#).unwrap();

        let s = SessionStore::new(local);
        assert_eq!(s.token().as_deref(), Some("persisted-token"));
        assert_eq!(s.user(), Some(serde_json::json!({"id": 3})));
    }

    #[test]
    fn malformed_persisted_user_hydrates_as_none() {
        let local = LocalStore::in_memory().unwrap();
        local.put(USER_KEY, "{not json").unwrap();

        let s = SessionStore::new(local);
        assert!(s.user().is_none());
    }

    #[test]
    fn survives_reopen_on_disk() {
        let tmp = TempDir::new().unwrap();
        let db = tmp.path().join("session.db");

        {
            let s = SessionStore::new(LocalStore::open(&db).unwrap());
            s.set_token(Some("disk-token"));
        }
        let s = SessionStore::new(LocalStore::open(&db).unwrap());
        assert_eq!(s.token().as_deref(), Some("disk-token"));
    }

    #[test]
    fn remove_many_clears_all_given_keys() {
        let local = LocalStore::in_memory().unwrap();
        local.put("a", "1").unwrap();
        local.put("b", "2").unwrap();
        local.put("c", "3").unwrap();

        local.remove_many(&["a", "b"]).unwrap();
        assert!(local.get("a").is_none());
        assert!(local.get("b").is_none());
        assert_eq!(local.get("c").as_deref(), Some("3"));
    }
}
