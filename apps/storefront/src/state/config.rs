//! # Application Configuration
//!
//! Settings for the item store backend, the signed-in session and the
//! catalog.
//!
//! ## Loading Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults              sqlite backend, user 1, related limit 6       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  2. storefront.toml       explicit path, or the platform config dir     │
//! │           │               (missing file = keep defaults)                │
//! │           ▼                                                             │
//! │  3. STOREFRONT_* env      STOREFRONT_BACKEND, STOREFRONT_BASE_URL,      │
//! │           │               STOREFRONT_DB_PATH, STOREFRONT_USER_ID,       │
//! │           │               STOREFRONT_CART_ID, STOREFRONT_RELATED_LIMIT  │
//! │           ▼                                                             │
//! │  4. validate()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example File
//! ```toml
//! [store]
//! backend = "http"
//! base_url = "http://localhost:3000"
//! timeout_secs = 10
//!
//! [session]
//! user_id = 1
//!
//! [catalog]
//! related_limit = 6
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use storefront_core::money::DEFAULT_SYMBOL;
use storefront_core::validation::validate_limit;
use storefront_core::{Money, DEFAULT_USER_ID};

/// Largest accepted `related_limit`.
pub const MAX_RELATED_LIMIT: i64 = 50;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Backend
// =============================================================================

/// Which item store implementation to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Remote REST item store.
    Http,
    /// Local SQLite item store.
    #[default]
    Sqlite,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Http => write!(f, "http"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" | "rest" | "remote" => Ok(Backend::Http),
            "sqlite" | "local" => Ok(Backend::Sqlite),
            other => Err(ConfigError::Invalid(format!(
                "Unknown backend: '{}'. Valid options: http, sqlite",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: Backend,

    /// Base URL of the REST item store (http backend).
    pub base_url: String,

    /// SQLite file (sqlite backend). Defaults to the platform data dir.
    pub db_path: Option<PathBuf>,

    /// Request timeout for the http backend.
    pub timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            backend: Backend::default(),
            base_url: "http://localhost:3000".to_string(),
            db_path: None,
            timeout_secs: 10,
        }
    }
}

impl StoreSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured SQLite path, else `<data dir>/storefront.db`, else
    /// `./storefront.db`.
    pub fn resolved_db_path(&self) -> PathBuf {
        if let Some(path) = &self.db_path {
            return path.clone();
        }
        directories::ProjectDirs::from("com", "storefront", "storefront")
            .map(|dirs| dirs.data_dir().join("storefront.db"))
            .unwrap_or_else(|| PathBuf::from("./storefront.db"))
    }
}

/// `[session]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Signed-in user.
    pub user_id: i64,

    /// Cart the product page adds to. Defaults to the user id.
    pub cart_id: Option<i64>,

    pub role: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            user_id: DEFAULT_USER_ID,
            cart_id: None,
            role: "user".to_string(),
        }
    }
}

/// `[catalog]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// How many products the related list requests.
    pub related_limit: usize,

    /// Symbol prices are displayed with.
    pub currency_symbol: String,
}

impl CatalogSettings {
    /// `Rp 10.000` with the default symbol.
    pub fn format_price(&self, price: Money) -> String {
        price.format_with(&self.currency_symbol)
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            related_limit: 6,
            currency_symbol: DEFAULT_SYMBOL.to_string(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreSettings,
    pub session: SessionSettings,
    pub catalog: CatalogSettings,
}

impl AppConfig {
    /// Loads configuration from file and environment, then validates it.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        info!(?path, "Config saved");
        Ok(())
    }

    /// Cart the session adds to.
    pub fn cart_id(&self) -> i64 {
        self.session.cart_id.unwrap_or(self.session.user_id)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == Backend::Http {
            let url = &self.store.base_url;
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "base_url must start with http:// or https://, got: {}",
                    url
                )));
            }
            if self.store.timeout_secs == 0 {
                return Err(ConfigError::Invalid(
                    "timeout_secs must be greater than 0".into(),
                ));
            }
        }

        if self.session.user_id <= 0 {
            return Err(ConfigError::Invalid(format!(
                "user_id must be positive, got: {}",
                self.session.user_id
            )));
        }
        if let Some(cart_id) = self.session.cart_id {
            if cart_id <= 0 {
                return Err(ConfigError::Invalid(format!(
                    "cart_id must be positive, got: {}",
                    cart_id
                )));
            }
        }

        let limit = i64::try_from(self.catalog.related_limit).unwrap_or(i64::MAX);
        validate_limit("related_limit", limit, MAX_RELATED_LIMIT)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(())
    }

    /// Applies `STOREFRONT_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("STOREFRONT_BACKEND") {
            debug!(%backend, "Overriding backend from environment");
            self.store.backend = backend.parse()?;
        }

        if let Some(url) = lookup("STOREFRONT_BASE_URL") {
            debug!(%url, "Overriding base URL from environment");
            self.store.base_url = url;
        }

        if let Some(path) = lookup("STOREFRONT_DB_PATH") {
            debug!(%path, "Overriding database path from environment");
            self.store.db_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup("STOREFRONT_USER_ID") {
            self.session.user_id = parse_env("STOREFRONT_USER_ID", &raw)?;
        }

        if let Some(raw) = lookup("STOREFRONT_CART_ID") {
            self.session.cart_id = Some(parse_env("STOREFRONT_CART_ID", &raw)?);
        }

        if let Some(raw) = lookup("STOREFRONT_RELATED_LIMIT") {
            self.catalog.related_limit = parse_env("STOREFRONT_RELATED_LIMIT", &raw)?;
        }

        Ok(())
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} is not a valid number: '{}'", key, raw)))
}
