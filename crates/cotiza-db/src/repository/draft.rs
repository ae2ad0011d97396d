//! # Draft Cache
//!
//! One slot per form, holding the last in-progress state so an accidental
//! reload loses nothing.
//!
//! ## Stored Shape
//! ```text
//! draft_sale_v1   → { "savedAt": "2025-09-01T12:00:00Z", "draft": { ... } }
//! draft_repair_v1 → null          (explicitly emptied)
//! draft_repair_v1 → { "quoteNumber": ..., "equipos": [...], "_ts": 1756728000000 }
//!                   (bare draft from older versions, `_ts` in epoch millis)
//! ```
//!
//! Loading never fails; anything unreadable is treated as "no draft".

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use cotiza_core::{RepairDraft, SaleDraft};

use crate::error::DbResult;
use crate::repository::read_text;
use crate::store::KeyValueStore;

/// Which form a draft belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftSlot {
    Sale,
    Repair,
}

/// A stored draft and when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftEntry<T> {
    pub saved_at: DateTime<Utc>,
    pub draft: T,
}

/// Draft persistence for the sale and repair forms.
#[derive(Debug, Clone)]
pub struct DraftCache<S> {
    store: S,
    sale_key: String,
    repair_key: String,
}

impl<S: KeyValueStore + Clone> DraftCache<S> {
    pub fn new(store: S, sale_key: impl Into<String>, repair_key: impl Into<String>) -> Self {
        DraftCache {
            store,
            sale_key: sale_key.into(),
            repair_key: repair_key.into(),
        }
    }

    fn key(&self, slot: DraftSlot) -> &str {
        match slot {
            DraftSlot::Sale => &self.sale_key,
            DraftSlot::Repair => &self.repair_key,
        }
    }

    /// Stores `draft` in `slot`; `None` writes an explicit empty marker.
    pub async fn save<T: Serialize + Sync>(&self, slot: DraftSlot, draft: Option<&T>) -> DbResult<()> {
        let key = self.key(slot);
        let text = match draft {
            Some(draft) => serde_json::to_string(&DraftEntry {
                saved_at: Utc::now(),
                draft,
            })?,
            None => Value::Null.to_string(),
        };

        debug!(key = %key, empty = draft.is_none(), "Saving draft");
        self.store.set(key, &text).await
    }

    /// The draft in `slot`, if a usable one is stored.
    pub async fn load<T: DeserializeOwned>(&self, slot: DraftSlot) -> Option<T> {
        self.load_entry(slot).await.map(|entry| entry.draft)
    }

    /// Like [`DraftCache::load`], with the time it was saved.
    pub async fn load_entry<T: DeserializeOwned>(&self, slot: DraftSlot) -> Option<DraftEntry<T>> {
        let key = self.key(slot);
        let text = read_text(&self.store, key).await?;

        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring unreadable draft");
                return None;
            }
        };
        if value.is_null() {
            return None;
        }
        if !value.is_object() {
            warn!(key = %key, "Ignoring draft that is not an object");
            return None;
        }

        let decoded = if value.get("savedAt").is_some() && value.get("draft").is_some() {
            serde_json::from_value::<DraftEntry<T>>(value)
        } else {
            let saved_at = value
                .get("_ts")
                .and_then(Value::as_i64)
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .unwrap_or_default();
            serde_json::from_value::<T>(value).map(|draft| DraftEntry { saved_at, draft })
        };

        match decoded {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring draft of unexpected shape");
                None
            }
        }
    }

    /// Removes the slot entirely.
    pub async fn clear(&self, slot: DraftSlot) -> DbResult<()> {
        let key = self.key(slot);
        debug!(key = %key, "Clearing draft");
        self.store.remove(key).await
    }

    // =========================================================================
    // Typed Convenience Methods
    // =========================================================================

    pub async fn save_sale(&self, draft: &SaleDraft) -> DbResult<()> {
        self.save(DraftSlot::Sale, Some(draft)).await
    }

    pub async fn load_sale(&self) -> Option<SaleDraft> {
        self.load(DraftSlot::Sale).await
    }

    pub async fn save_repair(&self, draft: &RepairDraft) -> DbResult<()> {
        self.save(DraftSlot::Repair, Some(draft)).await
    }

    pub async fn load_repair(&self) -> Option<RepairDraft> {
        self.load(DraftSlot::Repair).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use cotiza_core::{Money, Product};
    use serde_json::json;

    fn setup() -> (MemoryStore, DraftCache<MemoryStore>) {
        let store = MemoryStore::new();
        let cache = DraftCache::new(store.clone(), "draft_sale_v1", "draft_repair_v1");
        (store, cache)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load_sale_draft() {
        let (store, cache) = setup();
        let mut draft = SaleDraft::new(today());
        draft.client.name = "Ana".to_string();
        draft.add_product(&Product::new("A", "Alpha", Money::from_cents(1000)));

        cache.save_sale(&draft).await.unwrap();
        assert_eq!(cache.load_sale().await, Some(draft));

        let raw: Value = serde_json::from_str(&store.get("draft_sale_v1").await.unwrap().unwrap())
            .unwrap();
        assert!(raw.get("savedAt").is_some());
        assert_eq!(raw["draft"]["clientName"], "Ana");

        // slots are independent
        assert!(cache.load_repair().await.is_none());
    }

    #[tokio::test]
    async fn test_load_entry_reports_saved_at() {
        let (_, cache) = setup();
        let before = Utc::now();
        cache.save_repair(&RepairDraft::new(today())).await.unwrap();

        let entry = cache
            .load_entry::<RepairDraft>(DraftSlot::Repair)
            .await
            .unwrap();
        assert!(entry.saved_at >= before);
        assert_eq!(entry.draft.quote_number, "REP-0901-A");
    }

    #[tokio::test]
    async fn test_save_none_writes_null_marker() {
        let (store, cache) = setup();
        cache.save_sale(&SaleDraft::new(today())).await.unwrap();
        cache.save::<SaleDraft>(DraftSlot::Sale, None).await.unwrap();

        assert_eq!(store.get("draft_sale_v1").await.unwrap().as_deref(), Some("null"));
        assert!(cache.load_sale().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_drafts_load_as_none() {
        let (store, cache) = setup();

        for garbage in ["{broken", "[1,2]", "{\"draft\": 3}", "{\"savedAt\": \"x\"}"] {
            store.set("draft_sale_v1", garbage).await.unwrap();
            assert!(cache.load_sale().await.is_none(), "payload: {garbage}");
        }
    }

    #[tokio::test]
    async fn test_bare_draft_from_older_versions_loads() {
        let (store, cache) = setup();
        store
            .set(
                "draft_repair_v1",
                r#"{
                    "quoteNumber": "REP-0901-A",
                    "date": "2025-09-01",
                    "clientName": "Juan",
                    "equipos": [{
                        "id": "e1",
                        "marca": "Orbis",
                        "manoObra": "50",
                        "repuestos": [],
                        "sugOpen": false,
                        "sugIndex": -1
                    }],
                    "notes": "",
                    "_ts": 1756728000000
                }"#,
            )
            .await
            .unwrap();

        let entry = cache
            .load_entry::<RepairDraft>(DraftSlot::Repair)
            .await
            .unwrap();
        assert_eq!(entry.saved_at.timestamp_millis(), 1_756_728_000_000);
        assert_eq!(entry.draft.client.name, "Juan");
        assert_eq!(entry.draft.equipments.len(), 1);
        assert_eq!(entry.draft.equipments[0].mano_obra.cents(), 5000);

        // re-saving upgrades it to the envelope
        cache.save_repair(&entry.draft).await.unwrap();
        let raw: Value =
            serde_json::from_str(&store.get("draft_repair_v1").await.unwrap().unwrap()).unwrap();
        assert_eq!(raw["draft"]["equipments"][0]["marca"], "Orbis");
    }

    #[tokio::test]
    async fn test_generic_values_and_clear() {
        let (store, cache) = setup();
        let value = json!({ "anything": [1, 2, 3] });

        cache.save(DraftSlot::Repair, Some(&value)).await.unwrap();
        assert_eq!(cache.load::<Value>(DraftSlot::Repair).await, Some(value));

        cache.clear(DraftSlot::Repair).await.unwrap();
        assert!(store.get("draft_repair_v1").await.unwrap().is_none());
        assert!(cache.load::<Value>(DraftSlot::Repair).await.is_none());
    }
}
