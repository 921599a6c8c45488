//! Garden configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main Garden configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GardenConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Row store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Password gate configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

impl GardenConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed origins for CORS (empty = any)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18800,
            cors_origins: Vec::new(),
        }
    }
}

/// Row store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local, lost on exit
    Memory,

    /// JSON files under `data_dir` (default)
    #[default]
    File,

    /// PostgREST / Supabase endpoint at `url`
    Postgrest,
}

/// Row store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Which backend to use
    pub backend: StoreBackend,

    /// Base directory for the file backend
    pub data_dir: PathBuf,

    /// Project URL for the postgrest backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Environment variable holding the postgrest API key
    pub api_key_env: String,

    /// Collections created at startup by the memory backend
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<CollectionSeed>,
}

/// A collection to seed into an empty store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSeed {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            data_dir: crate::store::FileStore::default_dir(),
            url: None,
            api_key_env: "GARDEN_STORE_API_KEY".to_string(),
            collections: Vec::new(),
        }
    }
}

/// Password gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Environment variable holding the site password
    pub password_env: String,

    /// Environment variable holding the cookie signing key.
    /// When unset a random key is generated per process.
    pub signing_key_env: String,

    /// Session cookie name
    pub cookie_name: String,

    /// Session lifetime in days
    pub max_age_days: u32,

    /// Mark the cookie `Secure`
    pub secure_cookie: bool,
}

impl AuthConfig {
    /// Session lifetime in seconds
    pub fn max_age_secs(&self) -> i64 {
        i64::from(self.max_age_days) * 24 * 60 * 60
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_env: "SITE_PASSWORD".to_string(),
            signing_key_env: "GARDEN_SESSION_KEY".to_string(),
            cookie_name: "site-auth".to_string(),
            max_age_days: 30,
            secure_cookie: false,
        }
    }
}
