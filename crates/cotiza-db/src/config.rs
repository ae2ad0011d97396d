//! # Storage Configuration
//!
//! Where the database lives and which keys hold each collection.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! 1. Defaults            product_catalog_v1, quotes_v2, repairs_v1, ...
//! 2. Config file         cotiza.toml
//! 3. Environment         COTIZA_DB_PATH, COTIZA_CATALOG_KEY, ...
//! ```
//!
//! ## Example `cotiza.toml`
//! ```toml
//! database_path = "/var/lib/cotiza/cotiza.db"
//!
//! [keys]
//! catalog = "product_catalog_v1"
//! sale_quotes = "quotes_v2"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Database file name inside the platform data directory.
const DATABASE_FILE: &str = "cotiza.db";

// =============================================================================
// Storage Keys
// =============================================================================

/// Keys under which each collection is stored.
///
/// Changing a key points the app at a different (possibly empty) collection;
/// nothing is migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub catalog: String,
    pub sale_quotes: String,
    pub repair_quotes: String,
    pub sale_draft: String,
    pub repair_draft: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        StorageKeys {
            catalog: "product_catalog_v1".to_string(),
            sale_quotes: "quotes_v2".to_string(),
            repair_quotes: "repairs_v1".to_string(),
            sale_draft: "draft_sale_v1".to_string(),
            repair_draft: "draft_repair_v1".to_string(),
        }
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file. `None` means the platform default, see
    /// [`StoreConfig::database_path`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    pub keys: StorageKeys,
}

impl StoreConfig {
    /// Defaults overridden by environment variables.
    ///
    /// ## Environment Variables
    /// - `COTIZA_DB_PATH`: database file
    /// - `COTIZA_CATALOG_KEY`, `COTIZA_SALE_QUOTES_KEY`,
    ///   `COTIZA_REPAIR_QUOTES_KEY`, `COTIZA_SALE_DRAFT_KEY`,
    ///   `COTIZA_REPAIR_DRAFT_KEY`: storage keys
    pub fn from_env() -> Self {
        let mut config = StoreConfig::default();
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Parses a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> DbResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads `path` if it exists, then applies environment overrides.
    pub fn load(path: &Path) -> DbResult<Self> {
        let mut config = if path.exists() {
            info!(path = %path.display(), "Loading store config from file");
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml_str(&contents)?
        } else {
            debug!(path = %path.display(), "Config file not found, using defaults");
            StoreConfig::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// The configured database path, or the platform default.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .or_else(default_database_path)
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("COTIZA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        let keys = [
            ("COTIZA_CATALOG_KEY", &mut self.keys.catalog),
            ("COTIZA_SALE_QUOTES_KEY", &mut self.keys.sale_quotes),
            ("COTIZA_REPAIR_QUOTES_KEY", &mut self.keys.repair_quotes),
            ("COTIZA_SALE_DRAFT_KEY", &mut self.keys.sale_draft),
            ("COTIZA_REPAIR_DRAFT_KEY", &mut self.keys.repair_draft),
        ];
        for (name, slot) in keys {
            if let Some(value) = var(name).filter(|v| !v.trim().is_empty()) {
                debug!(var = name, key = %value, "Overriding storage key from environment");
                *slot = value;
            }
        }
    }
}

/// `<platform data dir>/cotiza.db`, when the platform has one.
pub fn default_database_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "cotiza", "cotiza")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
}

// =============================================================================
// Unit Tests
// =============================================================================
