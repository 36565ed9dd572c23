//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which holds the
//! API base URL, the token storage backend, the request timeout, and the last
//! email used to log in.
//!
//! Configuration is stored at `~/.config/profilehub/config.json`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, Session, TokenStore};

/// Application name used for config/session directory paths
const APP_NAME: &str = "profilehub";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured base URL
pub const BASE_URL_ENV: &str = "PROFILEHUB_API_BASE_URL";

/// Environment variable holding the passphrase that seals the session file
pub const PASSPHRASE_ENV: &str = "PROFILEHUB_STORE_PASSPHRASE";

/// Where session tokens are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    #[default]
    File,
    Keyring,
    Memory,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub token_storage: TokenStorage,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            token_storage: TokenStorage::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the session file
    pub fn session_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Base URL with precedence: environment, config file, built-in default
    pub fn resolve_base_url(&self, env_override: Option<String>) -> String {
        env_override
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn base_url(&self) -> String {
        self.resolve_base_url(std::env::var(BASE_URL_ENV).ok())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build the configured token store
    pub fn token_store(&self) -> Result<Box<dyn TokenStore>> {
        let store: Box<dyn TokenStore> = match self.token_storage {
            TokenStorage::File => {
                let store = FileTokenStore::new(self.session_dir()?);
                match std::env::var(PASSPHRASE_ENV) {
                    Ok(passphrase) if !passphrase.is_empty() => {
                        Box::new(store.with_passphrase(passphrase))
                    }
                    _ => Box::new(store),
                }
            }
            TokenStorage::Keyring => Box::new(KeyringTokenStore::new()?),
            TokenStorage::Memory => Box::new(MemoryTokenStore::new()),
        };
        Ok(store)
    }

    /// Open the session from the configured store
    pub fn open_session(&self) -> Result<Arc<Session>> {
        Ok(Arc::new(Session::from_boxed(self.token_store()?)))
    }
}
