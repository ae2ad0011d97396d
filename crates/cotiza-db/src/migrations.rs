//! # Schema Migrations
//!
//! The schema is a single key-value table; every document (catalog, quote
//! lists, drafts) lives in its `value` column as JSON text.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_kv_store.sql   kv_store(key PRIMARY KEY, value, updated_at)
//! ```
//!
//! The files are embedded at compile time and applied by [`Database::new`]
//! in filename order. New schema goes in a new `NNN_description.sql`; an
//! applied file is never edited, since sqlx checks its checksum.
//!
//! [`Database::new`]: crate::Database::new

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::DbResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far a database is behind the embedded migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.embedded
    }
}

/// Applies every embedded migration the database has not seen yet.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying migrations");
    MIGRATOR.run(pool).await?;
    info!("Schema up to date");
    Ok(())
}

/// Counts embedded vs applied migrations. A database that was never
/// migrated reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> MigrationStatus {
    let applied = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .map(|n| usize::try_from(n).unwrap_or(0))
        .unwrap_or_else(|e| {
            warn!(error = %e, "Migration table unreadable");
            0
        });

    MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied,
    }
}
