//! # Database Handle
//!
//! Opens the SQLite pool and hands out the stores built on it.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Opening the Database                               │
//! │                                                                         │
//! │  StoreConfig::from_env() ─► database path + storage keys               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::open(&config).await ← pool + migrations                     │
//! │       │                                                                 │
//! │       ├── store()          → SqliteStore (raw key-value access)        │
//! │       ├── catalog()        → CatalogStore        @ product_catalog_v1  │
//! │       ├── sale_quotes()    → QuoteRepository<SaleQuote>   @ quotes_v2  │
//! │       ├── repair_quotes()  → QuoteRepository<RepairQuote> @ repairs_v1 │
//! │       └── drafts()         → DraftCache  @ draft_sale_v1/draft_repair_v1│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Journal
//! File databases use WAL with NORMAL synchronous: readers never wait on the
//! single writer and a crash loses at most the last write. A busy timeout
//! covers a second process (the `seed` binary) writing at the same time.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use cotiza_core::{RepairQuote, SaleQuote};

use crate::config::{StorageKeys, StoreConfig};
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::{CatalogStore, DraftCache, QuoteRepository};
use crate::store::SqliteStore;

// =============================================================================
// Configuration
// =============================================================================

/// Where the SQLite data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// A database file, created (with its directory) if missing.
    File(PathBuf),
    /// A private in-memory database that disappears with the pool.
    Memory,
}

/// Pool configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/cotiza.db")
///     .max_connections(2)
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,

    /// Pool size. Default: 4. Always 1 in memory, where every extra
    /// connection would open a separate empty database.
    pub max_connections: u32,

    /// How long a connection waits on a lock held by another writer.
    pub busy_timeout: Duration,

    /// How long a caller waits for a free pooled connection.
    pub acquire_timeout: Duration,

    /// Apply pending migrations on open. Default: true.
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            max_connections: 4,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// In-memory database, for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            max_connections: 1,
            busy_timeout: Duration::from_secs(1),
            acquire_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.location {
            DbLocation::Memory => SqliteConnectOptions::from_str("sqlite::memory:")?,
            DbLocation::File(path) => {
                ensure_parent_dir(path)?;
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
            }
        };
        Ok(options.busy_timeout(self.busy_timeout))
    }

    fn pool_size(&self) -> u32 {
        match self.location {
            DbLocation::Memory => 1,
            DbLocation::File(_) => self.max_connections,
        }
    }
}

fn ensure_parent_dir(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .map_err(|e| DbError::ConnectionFailed(format!("{}: {e}", dir.display()))),
        _ => Ok(()),
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open database plus the keys its stores use.
///
/// Cheap to clone; every store handed out shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    keys: StorageKeys,
}

impl Database {
    /// Opens the pool with default storage keys and applies migrations
    /// unless disabled.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = ?config.location, "Opening database");

        let options = config.connect_options()?;
        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size())
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(connections = config.pool_size(), "Pool ready");

        let db = Database {
            pool,
            keys: StorageKeys::default(),
        };
        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        }
        Ok(db)
    }

    /// Opens the database a [`StoreConfig`] points at, with its keys.
    pub async fn open(config: &StoreConfig) -> DbResult<Self> {
        let db = Database::new(DbConfig::new(config.database_path())).await?;
        Ok(db.with_keys(config.keys.clone()))
    }

    /// Uses `keys` for every store handed out from now on.
    pub fn with_keys(mut self, keys: StorageKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Raw key-value access.
    pub fn store(&self) -> SqliteStore {
        SqliteStore::new(self.pool.clone())
    }

    /// Product catalog.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let products = db.catalog().list().await;
    /// ```
    pub fn catalog(&self) -> CatalogStore<SqliteStore> {
        CatalogStore::new(self.store(), self.keys.catalog.clone())
    }

    pub fn sale_quotes(&self) -> QuoteRepository<SqliteStore, SaleQuote> {
        QuoteRepository::new(self.store(), self.keys.sale_quotes.clone())
    }

    pub fn repair_quotes(&self) -> QuoteRepository<SqliteStore, RepairQuote> {
        QuoteRepository::new(self.store(), self.keys.repair_quotes.clone())
    }

    /// Form drafts, one slot per quote kind.
    pub fn drafts(&self) -> DraftCache<SqliteStore> {
        DraftCache::new(
            self.store(),
            self.keys.sale_draft.clone(),
            self.keys.repair_draft.clone(),
        )
    }

    /// Round-trips a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    /// Closes the pool; stores handed out fail from then on.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KeyValueStore;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert!(migrations::migration_status(db.pool()).await.is_current());
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/cotiza.db")
            .max_connections(0)
            .busy_timeout(Duration::from_millis(250))
            .run_migrations(false);

        assert_eq!(config.location, DbLocation::File(PathBuf::from("/tmp/cotiza.db")));
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(!config.run_migrations);

        let memory = DbConfig::in_memory().max_connections(8);
        assert_eq!(memory.pool_size(), 1);
    }

    #[tokio::test]
    async fn test_file_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cotiza.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.store().set("k", "\"v\"").await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(db.store().get("k").await.unwrap().as_deref(), Some("\"v\""));
        db.close().await;
    }

    #[tokio::test]
    async fn test_open_uses_configured_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StoreConfig {
            database_path: Some(dir.path().join("cotiza.db")),
            ..StoreConfig::default()
        };
        config.keys.catalog = "catalog_test".to_string();

        let db = Database::open(&config).await.unwrap();
        db.catalog().list().await;

        assert!(db.store().get("catalog_test").await.unwrap().is_some());
        assert!(db.store().get("product_catalog_v1").await.unwrap().is_none());
        db.close().await;
    }

    #[tokio::test]
    async fn test_closed_pool_fails_writes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
        assert!(db.store().set("k", "1").await.is_err());
    }
}
