//! # Repository Layer
//!
//! Typed collections on top of a [`KeyValueStore`].
//!
//! ## Read-Modify-Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  caller: db.sale_quotes().save(quote)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  read key ──► raw JSON array ──► edit by id ──► write key              │
//! │                                                                         │
//! │  Reads never fail: a missing, malformed or unreadable document is      │
//! │  logged and treated as empty. Writes return their errors.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogStore`] - Product catalog with load-or-seed
//! - [`QuoteRepository`] - Saved quotes of one kind
//! - [`DraftCache`] - In-progress form state

pub mod catalog;
pub mod draft;
pub mod quote;

pub use catalog::{CatalogLoad, CatalogOrigin, CatalogStore};
pub use draft::{DraftCache, DraftEntry, DraftSlot};
pub use quote::QuoteRepository;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{DbError, DbResult};
use crate::store::KeyValueStore;

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Entries kept after normalization.
    pub count: usize,
}

/// Reads the text under `key`, logging and swallowing backend errors.
pub(crate) async fn read_text<S: KeyValueStore>(store: &S, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(text) => text,
        Err(e) => {
            warn!(key = %key, error = %e, "Storage read failed, treating as empty");
            None
        }
    }
}

/// Reads the JSON array under `key`.
///
/// `None` when the key is missing, unreadable, not JSON or not an array.
pub(crate) async fn read_array<S: KeyValueStore>(store: &S, key: &str) -> Option<Vec<Value>> {
    let text = read_text(store, key).await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(entries)) => Some(entries),
        Ok(_) => {
            warn!(key = %key, "Stored collection is not an array, ignoring");
            None
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Stored collection is not valid JSON, ignoring");
            None
        }
    }
}

/// Serializes `value` and writes it under `key`.
pub(crate) async fn write_json<S: KeyValueStore, T: Serialize + ?Sized>(
    store: &S,
    key: &str,
    value: &T,
) -> DbResult<()> {
    let text = serde_json::to_string(value)?;
    store.set(key, &text).await
}

/// Parses an import payload that must be a JSON array.
pub(crate) fn parse_import(payload: &[u8]) -> DbResult<Vec<Value>> {
    match serde_json::from_slice::<Value>(payload) {
        Ok(Value::Array(entries)) => Ok(entries),
        Ok(_) => Err(DbError::format("expected a JSON array")),
        Err(e) => Err(DbError::format(e.to_string())),
    }
}
