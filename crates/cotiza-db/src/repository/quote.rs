//! # Quote Repository
//!
//! Saved quotes of one kind, stored as a JSON array under one key.
//!
//! ## Collections
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Quote Collections                                    │
//! │                                                                         │
//! │  quotes_v2   ── QuoteRepository<_, SaleQuote>    type = "venta"         │
//! │  repairs_v1  ── QuoteRepository<_, RepairQuote>  type = "reparacion"    │
//! │                 + export_snapshot / import_snapshot                     │
//! │                 + list_recent_first                                     │
//! │                                                                         │
//! │  save(q):  id missing? generate ──► same id stored? replace in place   │
//! │                                     └── else append                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are stored as given; totals are whatever the caller computed.
//! Writes edit the raw stored array, so records this version cannot decode
//! (or fields it does not model) survive every save and remove.

use std::cmp::Reverse;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use cotiza_core::id::{IdGenerator, UuidGenerator};
use cotiza_core::{QuoteRecord, RepairQuote};

use crate::error::DbResult;
use crate::repository::{parse_import, read_array, write_json, ImportSummary};
use crate::store::KeyValueStore;

/// Repository for one quote kind.
///
/// ## Usage
/// ```rust,ignore
/// let quotes = db.sale_quotes();
/// let id = quotes.save(draft.finalize(Utc::now())).await?;
/// let found = quotes.search("ferretería").await;
/// ```
pub struct QuoteRepository<S, Q> {
    store: S,
    key: String,
    ids: Arc<dyn IdGenerator>,
    _kind: PhantomData<fn() -> Q>,
}

impl<S: Clone, Q> Clone for QuoteRepository<S, Q> {
    fn clone(&self) -> Self {
        QuoteRepository {
            store: self.store.clone(),
            key: self.key.clone(),
            ids: Arc::clone(&self.ids),
            _kind: PhantomData,
        }
    }
}

impl<S: fmt::Debug, Q> fmt::Debug for QuoteRepository<S, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteRepository")
            .field("store", &self.store)
            .field("key", &self.key)
            .field("ids", &self.ids)
            .finish()
    }
}

impl<S: KeyValueStore + Clone, Q: QuoteRecord> QuoteRepository<S, Q> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        QuoteRepository {
            store,
            key: key.into(),
            ids: Arc::new(UuidGenerator),
            _kind: PhantomData,
        }
    }

    /// Replaces the id generator.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Every stored record of this kind, in stored order.
    ///
    /// Never fails: a missing or malformed collection is empty, and records
    /// that don't decode or carry another `type` are skipped.
    pub async fn list(&self) -> Vec<Q> {
        let Some(raw) = read_array(&self.store, &self.key).await else {
            return Vec::new();
        };

        raw.into_iter()
            .enumerate()
            .filter_map(|(index, value)| self.decode(index, value))
            .collect()
    }

    fn decode(&self, index: usize, value: Value) -> Option<Q> {
        if let Some(tag) = value.get("type").and_then(Value::as_str) {
            if tag != Q::KIND.as_str() {
                warn!(key = %self.key, index, tag, "Skipping record of another kind");
                return None;
            }
        }

        match serde_json::from_value::<Q>(value) {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!(key = %self.key, index, error = %e, "Skipping undecodable record");
                None
            }
        }
    }

    /// Saves a quote and returns its id.
    ///
    /// A quote without id gets a fresh one and is appended; a quote whose id
    /// is already stored replaces that record in place.
    pub async fn save(&self, mut quote: Q) -> DbResult<String> {
        let id = match quote.id() {
            Some(id) => id.to_string(),
            None => {
                let id = self.ids.generate();
                quote.set_id(id.clone());
                id
            }
        };

        let record = serde_json::to_value(&quote)?;
        let mut raw = self.raw().await;
        match raw.iter_mut().find(|v| stored_id(v) == Some(id.as_str())) {
            Some(existing) => {
                debug!(key = %self.key, id = %id, "Replacing quote");
                *existing = record;
            }
            None => {
                debug!(key = %self.key, id = %id, "Appending quote");
                raw.push(record);
            }
        }

        write_json(&self.store, &self.key, &raw).await?;
        Ok(id)
    }

    /// Deletes a quote. Unknown ids are a no-op.
    pub async fn remove(&self, id: &str) -> DbResult<()> {
        let mut raw = self.raw().await;
        let before = raw.len();
        raw.retain(|v| stored_id(v) != Some(id));

        if raw.len() == before {
            debug!(key = %self.key, id = %id, "Nothing to remove");
            return Ok(());
        }
        write_json(&self.store, &self.key, &raw).await
    }

    /// The stored array as-is; empty when missing or malformed.
    async fn raw(&self) -> Vec<Value> {
        read_array(&self.store, &self.key).await.unwrap_or_default()
    }

    /// Empties the collection.
    pub async fn clear(&self) -> DbResult<()> {
        info!(key = %self.key, "Clearing quotes");
        write_json(&self.store, &self.key, &Vec::<Value>::new()).await
    }

    pub async fn get(&self, id: &str) -> Option<Q> {
        self.list().await.into_iter().find(|q| q.id() == Some(id))
    }

    /// Quotes whose number or client fields (and for repairs, notes and
    /// equipment) contain `query`, case-insensitively.
    pub async fn search(&self, query: &str) -> Vec<Q> {
        self.list()
            .await
            .into_iter()
            .filter(|q| q.matches(query))
            .collect()
    }
}

fn stored_id(record: &Value) -> Option<&str> {
    record
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

// =============================================================================
// Repair-only Operations
// =============================================================================

impl<S: KeyValueStore + Clone> QuoteRepository<S, RepairQuote> {
    /// Repairs sorted by date, newest first; ties by creation time.
    pub async fn list_recent_first(&self) -> Vec<RepairQuote> {
        let mut quotes = self.list().await;
        quotes.sort_by_key(|q| Reverse((q.date, q.created_at)));
        quotes
    }

    /// Pretty-printed stored array, exactly as kept (unknown fields and
    /// undecodable records included).
    pub async fn export_snapshot(&self) -> DbResult<String> {
        Ok(serde_json::to_string_pretty(&self.raw().await)?)
    }

    /// Replaces the whole collection with a JSON array, stored verbatim.
    ///
    /// ## Errors
    /// `DbError::Format` when the payload is not JSON or not an array.
    pub async fn import_snapshot(&self, payload: &[u8]) -> DbResult<ImportSummary> {
        let raw = parse_import(payload)?;
        info!(key = %self.key, count = raw.len(), "Importing repairs");
        write_json(&self.store, &self.key, &raw).await?;
        Ok(ImportSummary { count: raw.len() })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
