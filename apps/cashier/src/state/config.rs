//! # Cashier Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     ZOO_STORAGE=json  ZOO_DATA_DIR=...  ZOO_PRINT_DIR=...               │
//! │     ZOO_STORE_NAME="Zoo de Kinshasa"                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     $ZOO_CONFIG, or the platform config dir:                            │
//! │     ~/.config/zoo-cashier/cashier.toml (Linux)                          │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     SQLite in the platform data dir, prints next to it                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Zoo de Kinshasa"
//! address = "BP 1234 Kinshasa"
//! phone = "+243 81 123 4567"
//! website = "www.zookinshasa.cd"
//! currency = "FC"
//!
//! [storage]
//! backend = "sqlite"   # sqlite | json | memory
//! data_dir = "/var/lib/zoo-cashier"
//!
//! [print]
//! dir = "/var/lib/zoo-cashier/prints"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// File name of the configuration inside the config directory.
pub const CONFIG_FILE: &str = "cashier.toml";

/// SQLite file name inside the data directory.
pub const DATABASE_FILE: &str = "zoo-cashier.db";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Lecture de la configuration impossible : {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration invalide : {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Écriture de la configuration impossible : {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Configuration invalide : {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Storage Backend
// =============================================================================

/// Where the ledger and the finance orders live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    /// `zoo-sales.json` + `zoo-finance-orders.json`
    Json,
    /// Nothing survives the process.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Json => write!(f, "json"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "db" => Ok(StorageBackend::Sqlite),
            "json" | "files" => Ok(StorageBackend::Json),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid(format!(
                "stockage inconnu '{}' (sqlite, json, memory)",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Store identity printed on every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    #[serde(default = "default_store_name")]
    pub name: String,

    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_phone")]
    pub phone: String,

    #[serde(default = "default_website")]
    pub website: String,

    /// Currency suffix on amounts.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_store_name() -> String {
    "Zoo de Kinshasa".to_string()
}

fn default_address() -> String {
    "BP 1234 Kinshasa".to_string()
}

fn default_phone() -> String {
    "+243 81 123 4567".to_string()
}

fn default_website() -> String {
    "www.zookinshasa.cd".to_string()
}

fn default_currency() -> String {
    zoo_core::money::DEFAULT_SYMBOL.to_string()
}

impl Default for StoreInfo {
    fn default() -> Self {
        StoreInfo {
            name: default_store_name(),
            address: default_address(),
            phone: default_phone(),
            website: default_website(),
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Defaults to the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSettings {
    /// Defaults to `<data_dir>/prints`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashierConfig {
    #[serde(default)]
    pub store: StoreInfo,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub print: PrintSettings,
}

impl CashierConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, `$ZOO_CONFIG`, or the platform path)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var_os("ZOO_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading cashier config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cashier config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        info!(?path, "Cashier config saved");
        Ok(())
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.name ne peut pas être vide".into()));
        }
        if self.store.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("store.currency ne peut pas être vide".into()));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(backend) = std::env::var("ZOO_STORAGE") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding storage backend from environment");
                    self.storage.backend = parsed;
                }
                Err(e) => warn!(backend = %backend, "Ignoring ZOO_STORAGE: {}", e),
            }
        }

        if let Some(dir) = std::env::var_os("ZOO_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(dir) = std::env::var_os("ZOO_PRINT_DIR") {
            self.print.dir = Some(PathBuf::from(dir));
        }

        if let Ok(name) = std::env::var("ZOO_STORE_NAME") {
            self.store.name = name;
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("cd", "zookinshasa", "zoo-cashier")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Resolved Paths
    // =========================================================================

    /// Data directory: configured, platform default, or the working dir.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(DATABASE_FILE)
    }

    pub fn print_dir(&self) -> PathBuf {
        self.print
            .dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("prints"))
    }

    /// Configuration for an isolated run under `dir` (tests, demos).
    pub fn under(dir: &Path, backend: StorageBackend) -> Self {
        CashierConfig {
            store: StoreInfo::default(),
            storage: StorageSettings {
                backend,
                data_dir: Some(dir.to_path_buf()),
            },
            print: PrintSettings {
                dir: Some(dir.join("prints")),
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CashierConfig::default();
        assert_eq!(config.store.name, "Zoo de Kinshasa");
        assert_eq!(config.store.currency, "FC");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: CashierConfig = toml::from_str(
            r#"
            [store]
            name = "Zoo de Lubumbashi"

            [storage]
            backend = "json"
            data_dir = "/srv/zoo"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Zoo de Lubumbashi");
        assert_eq!(config.store.phone, "+243 81 123 4567");
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.data_dir(), PathBuf::from("/srv/zoo"));
        assert_eq!(config.print_dir(), PathBuf::from("/srv/zoo/prints"));
        assert_eq!(config.database_path(), PathBuf::from("/srv/zoo/zoo-cashier.db"));
    }

    #[test]
    fn test_load_from_explicit_file_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join(CONFIG_FILE);

        let mut config = CashierConfig::under(dir.path(), StorageBackend::Memory);
        config.store.website = "zoo.example".to_string();
        config.save(&path).unwrap();

        let loaded = CashierConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.store.website, "zoo.example");
        assert_eq!(loaded.print_dir(), dir.path().join("prints"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[storage]\nbackend = \"floppy\"\n").unwrap();

        assert!(matches!(
            CashierConfig::load(Some(path.clone())),
            Err(ConfigError::Parse(_))
        ));
        // Falls back quietly when asked to
        assert_eq!(
            CashierConfig::load_or_default(Some(path)).store.name,
            "Zoo de Kinshasa"
        );
    }

    #[test]
    fn test_blank_store_name_rejected() {
        let mut config = CashierConfig::default();
        config.store.name = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("JSON".parse::<StorageBackend>().unwrap(), StorageBackend::Json);
        assert_eq!("mem".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("floppy".parse::<StorageBackend>().is_err());
    }
}
