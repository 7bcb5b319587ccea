//! Application configuration.
//!
//! Loaded from `~/.hederair/config.toml`; every field has a default so a
//! missing file is not an error and a fresh install works unconfigured.

use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default remote API the auth flows talk to.
pub const DEFAULT_API_BASE_URL: &str = "https://team-7-api.onrender.com";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_network() -> String {
    "testnet".to_string()
}

fn default_project_id() -> String {
    "fd608b25403164bd77112a43d98951ed".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the remote auth API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub wallet: WalletConfig,

    /// Directory holding local state (session database).  Not serialized;
    /// derived from the config location.
    #[serde(skip)]
    pub data_dir: PathBuf,
}

/// Pairing transport settings handed to the wallet SDK.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Hedera network the pairing targets.
    #[serde(default = "default_network")]
    pub network: String,

    /// WalletConnect project id used by the relay.
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// App metadata shown in the wallet's approval prompt.
    #[serde(default)]
    pub app: AppMetadata,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            project_id: default_project_id(),
            app: AppMetadata::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "HederaAir".to_string(),
            description: "HederaAir sign-in".to_string(),
            url: "https://hederair.example".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            wallet: WalletConfig::default(),
            data_dir: PathBuf::new(),
        }
    }
}

impl Config {
    /// The `~/.hederair` directory.
    pub fn default_dir() -> anyhow::Result<PathBuf> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".hederair"))
    }

    /// Load from `<dir>/config.toml`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let path = dir.join("config.toml");
        let mut config: Config = match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(anyhow::anyhow!("Failed to read config: {e}")),
        };
        config.data_dir = dir.to_path_buf();
        Ok(config)
    }

    /// Load from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::default_dir()?)
    }

    /// Write the config back to `<data_dir>/config.toml`.
    pub fn save(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let contents = toml::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        std::fs::write(self.data_dir.join("config.toml"), contents)?;
        Ok(())
    }

    /// Path of the session database inside the data directory.
    pub fn session_db_path(&self) -> PathBuf {
        self.data_dir.join("session.db")
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_from(tmp.path()).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.wallet.network, "testnet");
        assert_eq!(config.data_dir, tmp.path());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "api_base_url = \"http://localhost:8000\"\n",
        )
        .unwrap();

        let config = Config::load_from(tmp.path()).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.wallet.network, "testnet");
        assert_eq!(config.wallet.app.name, "HederaAir");
    }

    #[test]
    fn save_round_trips() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::load_from(tmp.path()).unwrap();
        config.api_base_url = "http://localhost:9000".into();
        config.wallet.network = "mainnet".into();
        config.save().unwrap();

        let reloaded = Config::load_from(tmp.path()).unwrap();
        assert_eq!(reloaded.api_base_url, "http://localhost:9000");
        assert_eq!(reloaded.wallet.network, "mainnet");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "api_base_url = [broken").unwrap();
        assert!(Config::load_from(tmp.path()).is_err());
    }

    #[test]
    fn session_db_lives_in_data_dir() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_from(tmp.path()).unwrap();
        assert_eq!(config.session_db_path(), tmp.path().join("session.db"));
    }
}
