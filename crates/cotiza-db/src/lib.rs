//! # cotiza-db: Storage Layer for Cotiza
//!
//! Persists the product catalog, saved quotes and form drafts as JSON
//! documents in a key-value table of a local SQLite database (or in memory).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cotiza Data Flow                                 │
//! │                                                                         │
//! │  SaleDraft / RepairDraft (cotiza-core)                                 │
//! │       │ finalize()                                                      │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     cotiza-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │    Store     │  │   │
//! │  │   │   (pool.rs)   │    │               │    │              │  │   │
//! │  │   │               │    │ CatalogStore  │    │ SqliteStore  │  │   │
//! │  │   │ SqlitePool    │───►│ QuoteRepo<Q>  │───►│ MemoryStore  │  │   │
//! │  │   │ StorageKeys   │    │ DraftCache    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   kv_store table in <platform data dir>/cotiza.db               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool and the [`Database`] handle
//! - [`store`] - Key-value backends
//! - [`repository`] - Catalog, quote and draft repositories
//! - [`config`] - Storage keys and database path
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cotiza_db::{Database, StoreConfig};
//!
//! let db = Database::open(&StoreConfig::from_env()).await?;
//!
//! let products = db.catalog().list().await;
//! let id = db.sale_quotes().save(draft.finalize(Utc::now())).await?;
//! db.drafts().save_sale(&draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{StorageKeys, StoreConfig};
pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig, DbLocation};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};

pub use repository::{
    CatalogLoad, CatalogOrigin, CatalogStore, DraftCache, DraftEntry, DraftSlot, ImportSummary,
    QuoteRepository,
};
