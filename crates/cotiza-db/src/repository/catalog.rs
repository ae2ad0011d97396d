//! # Catalog Store
//!
//! The product catalog, persisted as one JSON array.
//!
//! ## Load-or-Seed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How the Catalog Loads                                │
//! │                                                                         │
//! │  read product_catalog_v1                                               │
//! │       │                                                                 │
//! │       ├── missing / not JSON / not an array ──┐                         │
//! │       │                                       │                         │
//! │       ▼                                       │                         │
//! │  normalize every entry, drop invalid ones     │                         │
//! │       │                                       │                         │
//! │       ├── nothing valid left ─────────────────┤                         │
//! │       │                                       ▼                         │
//! │       │                          write default catalog, return it      │
//! │       ▼                          (origin = Seeded)                      │
//! │  return valid entries (origin = Loaded)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info, warn};

use cotiza_core::catalog::{self, SUGGESTION_LIMIT};
use cotiza_core::Product;

use crate::error::DbResult;
use crate::repository::{parse_import, read_array, write_json, ImportSummary};
use crate::store::KeyValueStore;

/// Where a loaded catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Read from storage (possibly with invalid entries filtered out).
    Loaded,
    /// Storage had nothing usable; the defaults were written.
    Seeded,
}

/// Result of [`CatalogStore::load_or_seed`].
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogLoad {
    pub products: Vec<Product>,
    pub origin: CatalogOrigin,
}

/// Catalog persistence.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = db.catalog();
/// catalog.upsert(&Product::new("TERM-01", "Termocupla", Money::from_cents(450_000))).await?;
/// let hits = catalog.search("term", 30).await;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore + Clone> CatalogStore<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        CatalogStore {
            store,
            key: key.into(),
        }
    }

    /// Current catalog. Never fails and never returns an empty list.
    pub async fn list(&self) -> Vec<Product> {
        self.load_or_seed().await.products
    }

    /// Loads the catalog, reseeding when nothing valid is stored.
    pub async fn load_or_seed(&self) -> CatalogLoad {
        if let Some(raw) = read_array(&self.store, &self.key).await {
            let products = catalog::normalize_all(&raw);
            if !products.is_empty() {
                if products.len() != raw.len() {
                    warn!(
                        key = %self.key,
                        dropped = raw.len() - products.len(),
                        "Ignoring invalid catalog entries"
                    );
                }
                return CatalogLoad {
                    products,
                    origin: CatalogOrigin::Loaded,
                };
            }
        }

        let products = catalog::default_products();
        info!(key = %self.key, count = products.len(), "Seeding default catalog");
        if let Err(e) = write_json(&self.store, &self.key, &products).await {
            warn!(key = %self.key, error = %e, "Could not persist default catalog");
        }

        CatalogLoad {
            products,
            origin: CatalogOrigin::Seeded,
        }
    }

    /// Replaces the whole catalog. Invalid entries are dropped.
    ///
    /// Returns the number of entries written.
    pub async fn replace_all(&self, products: &[Product]) -> DbResult<usize> {
        let clean: Vec<Product> = products.iter().filter_map(catalog::sanitize).collect();
        debug!(key = %self.key, count = clean.len(), "Replacing catalog");
        write_json(&self.store, &self.key, &clean).await?;
        Ok(clean.len())
    }

    /// Inserts or merges a product by case-insensitive SKU.
    ///
    /// Returns `false` (and writes nothing) when the product is invalid.
    pub async fn upsert(&self, product: &Product) -> DbResult<bool> {
        let mut products = self.list().await;
        if !catalog::upsert(&mut products, product) {
            debug!(sku = %product.sku, "Ignoring invalid product");
            return Ok(false);
        }
        write_json(&self.store, &self.key, &products).await?;
        Ok(true)
    }

    /// Removes a product by case-insensitive SKU. Unknown SKUs are a no-op.
    pub async fn remove(&self, sku: &str) -> DbResult<bool> {
        let mut products = self.list().await;
        if !catalog::remove(&mut products, sku) {
            return Ok(false);
        }
        write_json(&self.store, &self.key, &products).await?;
        Ok(true)
    }

    /// Overwrites the catalog with the defaults.
    pub async fn reset_to_defaults(&self) -> DbResult<Vec<Product>> {
        let products = catalog::default_products();
        info!(key = %self.key, "Resetting catalog to defaults");
        write_json(&self.store, &self.key, &products).await?;
        Ok(products)
    }

    /// Pretty-printed JSON array of the current catalog.
    pub async fn export_snapshot(&self) -> DbResult<String> {
        Ok(serde_json::to_string_pretty(&self.list().await)?)
    }

    /// Replaces the catalog with the valid entries of a JSON array.
    ///
    /// ## Errors
    /// `DbError::Format` when the payload is not JSON or not an array.
    pub async fn import_snapshot(&self, payload: &[u8]) -> DbResult<ImportSummary> {
        let raw = parse_import(payload)?;
        let products = catalog::normalize_all(&raw);

        info!(
            key = %self.key,
            received = raw.len(),
            kept = products.len(),
            "Importing catalog"
        );
        write_json(&self.store, &self.key, &products).await?;

        Ok(ImportSummary {
            count: products.len(),
        })
    }

    /// Suggestions for a typed query (SKU or name substring).
    pub async fn search(&self, query: &str, limit: usize) -> Vec<Product> {
        let products = self.list().await;
        catalog::search(&products, query, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Suggestions with the standard limit.
    pub async fn suggest(&self, query: &str) -> Vec<Product> {
        self.search(query, SUGGESTION_LIMIT).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::store::MemoryStore;
    use cotiza_core::Money;

    const KEY: &str = "product_catalog_v1";

    fn setup() -> (MemoryStore, CatalogStore<MemoryStore>) {
        let store = MemoryStore::new();
        (store.clone(), CatalogStore::new(store, KEY))
    }

    fn product(sku: &str, name: &str, cents: i64) -> Product {
        Product::new(sku, name, Money::from_cents(cents))
    }

    #[tokio::test]
    async fn test_empty_storage_seeds_and_persists() {
        let (store, catalog) = setup();

        let load = catalog.load_or_seed().await;
        assert_eq!(load.origin, CatalogOrigin::Seeded);
        assert_eq!(load.products, catalog::default_products());
        assert!(store.get(KEY).await.unwrap().is_some());

        assert_eq!(catalog.load_or_seed().await.origin, CatalogOrigin::Loaded);
    }

    #[tokio::test]
    async fn test_malformed_storage_seeds() {
        for garbage in ["{oops", "{\"sku\":\"A\"}", "[1, \"x\", {\"sku\": \"\"}]"] {
            let (store, catalog) = setup();
            store.set(KEY, garbage).await.unwrap();

            let load = catalog.load_or_seed().await;
            assert_eq!(load.origin, CatalogOrigin::Seeded, "payload: {garbage}");
            assert_eq!(load.products.len(), catalog::default_products().len());
        }
    }

    #[tokio::test]
    async fn test_partially_corrupt_catalog_keeps_valid_entries() {
        let (store, catalog) = setup();
        store
            .set(KEY, r#"[{"sku":"A","name":"Alpha","price":"1.5"},{"sku":"","name":"x","price":1}]"#)
            .await
            .unwrap();

        let load = catalog.load_or_seed().await;
        assert_eq!(load.origin, CatalogOrigin::Loaded);
        assert_eq!(load.products, vec![product("A", "Alpha", 150)]);
    }

    #[tokio::test]
    async fn test_import_filters_and_keeps_order() {
        let (_, catalog) = setup();
        let payload = br#"[
            {"sku":"A","name":"Alpha","price":10},
            {"sku":"","name":"Empty","price":5},
            {"sku":"B","name":"Beta","price":-1},
            {"sku":"C","name":"Gamma","price":"abc"}
        ]"#;

        let summary = catalog.import_snapshot(payload).await.unwrap();
        assert_eq!(summary, ImportSummary { count: 1 });
        assert_eq!(catalog.list().await, vec![product("A", "Alpha", 1000)]);
    }

    #[tokio::test]
    async fn test_import_rejects_non_array() {
        let (_, catalog) = setup();
        catalog.replace_all(&[product("A", "Alpha", 100)]).await.unwrap();

        let err = catalog.import_snapshot(b"{\"sku\":\"A\"}").await.unwrap_err();
        assert!(matches!(err, DbError::Format(_)));
        assert!(matches!(
            catalog.import_snapshot(b"not json").await,
            Err(DbError::Format(_))
        ));

        // catalog untouched
        assert_eq!(catalog.list().await, vec![product("A", "Alpha", 100)]);
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let (_, catalog) = setup();
        let original = catalog.list().await;

        let snapshot = catalog.export_snapshot().await.unwrap();
        catalog.replace_all(&[product("Z", "Zeta", 1)]).await.unwrap();
        let summary = catalog.import_snapshot(snapshot.as_bytes()).await.unwrap();

        assert_eq!(summary.count, original.len());
        assert_eq!(catalog.list().await, original);
    }

    #[tokio::test]
    async fn test_upsert_merges_and_is_idempotent() {
        let (_, catalog) = setup();
        catalog.replace_all(&[product("ab-1", "Old", 100)]).await.unwrap();

        assert!(catalog.upsert(&product("AB-1", "New", 200)).await.unwrap());
        assert!(catalog.upsert(&product("AB-1", "New", 200)).await.unwrap());
        assert_eq!(catalog.list().await, vec![product("AB-1", "New", 200)]);

        assert!(!catalog.upsert(&product("", "Blank", 1)).await.unwrap());
        assert_eq!(catalog.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let (_, catalog) = setup();
        catalog
            .replace_all(&[product("A", "Alpha", 1), product("B", "Beta", 2)])
            .await
            .unwrap();

        assert!(!catalog.remove("zz").await.unwrap());
        assert!(catalog.remove(" a ").await.unwrap());
        assert_eq!(catalog.list().await, vec![product("B", "Beta", 2)]);
    }

    #[tokio::test]
    async fn test_reset_and_search() {
        let (_, catalog) = setup();
        catalog.replace_all(&[product("A", "Alpha", 1)]).await.unwrap();

        let defaults = catalog.reset_to_defaults().await.unwrap();
        assert_eq!(catalog.list().await, defaults);

        let hits = catalog.suggest("TERM").await;
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|p| {
            p.sku.to_lowercase().contains("term") || p.name.to_lowercase().contains("term")
        }));
        assert_eq!(catalog.search("e", 3).await.len(), 3);
    }
}
