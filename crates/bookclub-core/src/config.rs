//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! backend URL, the token storage key and backend, and the last identifier
//! used to sign in.
//!
//! Configuration is stored at `~/.config/bookclub/config.json`. The
//! `BOOKCLUB_API_URL` and `BOOKCLUB_TOKEN_KEY` environment variables take
//! precedence over the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::GatewayConfig;
use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "bookclub";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Log file name inside the data directory
pub const LOG_FILE: &str = "bookclub.log";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TOKEN_KEY: &str = "auth_token";

pub const API_URL_ENV: &str = "BOOKCLUB_API_URL";
pub const TOKEN_KEY_ENV: &str = "BOOKCLUB_TOKEN_KEY";

/// Where the session token is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub token_key: Option<String>,
    #[serde(default)]
    pub token_backend: TokenBackend,
    pub last_identifier: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default location of the config file
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(LOG_FILE))
    }

    pub fn api_base_url(&self) -> String {
        self.api_base_url_with(|name| std::env::var(name).ok())
    }

    pub fn token_key(&self) -> String {
        self.token_key_with(|name| std::env::var(name).ok())
    }

    fn api_base_url_with(&self, env: impl Fn(&str) -> Option<String>) -> String {
        first_non_blank([env(API_URL_ENV), self.api_base_url.clone()])
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    fn token_key_with(&self, env: impl Fn(&str) -> Option<String>) -> String {
        first_non_blank([env(TOKEN_KEY_ENV), self.token_key.clone()])
            .unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string())
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.api_base_url(),
            token_key: self.token_key(),
        }
    }

    /// Open the configured token backend
    pub fn token_store(&self) -> Result<Arc<dyn TokenStore>> {
        let store: Arc<dyn TokenStore> = match self.token_backend {
            TokenBackend::File => Arc::new(FileTokenStore::new(&self.data_dir()?)),
            TokenBackend::Keyring => Arc::new(KeyringTokenStore::new()),
            TokenBackend::Memory => Arc::new(MemoryTokenStore::new()),
        };
        Ok(store)
    }
}

fn first_non_blank<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}
