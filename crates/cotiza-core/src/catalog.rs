//! # Catalog Rules
//!
//! Pure catalog logic: normalization of untrusted entries, case-insensitive
//! SKU identity, upsert/remove on an in-memory list, suggestion search and
//! the default seed. Persistence lives in `cotiza-db`.
//!
//! ## Normalization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw JSON entry                 normalized                              │
//! │  ──────────────────────────     ──────────────────────────────          │
//! │  { sku: " ab-1 ",          ──►  { sku: "ab-1",                          │
//! │    name: "Válvula",               name: "Válvula",                      │
//! │    price: "12.5" }                price: 12.50 }                        │
//! │                                                                         │
//! │  { sku: "", ... }          ──►  dropped (empty SKU)                     │
//! │  { price: -3, ... }        ──►  dropped (negative price)                │
//! │  { price: "abc", ... }     ──►  dropped (non-numeric price)             │
//! │  42                        ──►  dropped (not an object)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::Value;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_price, validate_product_name, validate_sku, ValidationResult};

/// Maximum suggestions offered while typing in a quote form.
pub const SUGGESTION_LIMIT: usize = 30;

/// Seed catalog written whenever the stored one is missing or unusable.
const DEFAULT_PRODUCTS: &[(&str, &str, i64)] = &[
    ("TERM-01", "Termocupla universal", 450_000),
    ("PIL-01", "Piloto completo", 980_000),
    ("VALV-GAS", "Válvula de gas", 1_850_000),
    ("TERMOSTATO", "Termostato regulable", 1_250_000),
    ("ENC-PIEZO", "Encendido piezoeléctrico", 320_000),
    ("ANODO-MG", "Ánodo de magnesio", 760_000),
    ("FLEX-12", "Flexible de conexión 1/2\"", 290_000),
    ("RES-1500", "Resistencia 1500W", 1_540_000),
    ("SERV-INST", "Instalación a domicilio", 2_500_000),
];

/// Returns the default product set.
pub fn default_products() -> Vec<Product> {
    DEFAULT_PRODUCTS
        .iter()
        .map(|(sku, name, cents)| Product::new(*sku, *name, Money::from_cents(*cents)))
        .collect()
}

// =============================================================================
// Normalization
// =============================================================================

/// Normalizes an untrusted JSON entry into a valid product.
///
/// `sku` and `name` may be strings or numbers and are trimmed; `price` may be
/// a number or a numeric string. Returns `None` for anything that does not
/// produce a valid product.
pub fn normalize_product(raw: &Value) -> Option<Product> {
    let obj = raw.as_object()?;

    let sku = text_field(obj.get("sku"))?;
    let name = text_field(obj.get("name"))?;
    let price = price_field(obj.get("price"))?;

    validate_product(&sku, &name, price).ok()?;
    Some(Product::new(sku, name, Money::from_major(price)))
}

/// Normalizes every entry, dropping invalid ones and keeping order.
pub fn normalize_all(raw: &[Value]) -> Vec<Product> {
    raw.iter().filter_map(normalize_product).collect()
}

/// Trims and validates an already-typed product.
pub fn sanitize(product: &Product) -> Option<Product> {
    let sku = product.sku.trim();
    let name = product.name.trim();

    validate_sku(sku).ok()?;
    validate_product_name(name).ok()?;
    if product.price.is_negative() {
        return None;
    }

    Some(Product::new(sku, name, product.price))
}

fn validate_product(sku: &str, name: &str, price: f64) -> ValidationResult<()> {
    validate_sku(sku)?;
    validate_product_name(name)?;
    validate_price(price)
}

fn text_field(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn price_field(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

// =============================================================================
// List Operations
// =============================================================================

/// Inserts or merges `product` into `list` by case-insensitive SKU.
///
/// Invalid products leave the list untouched and return `false`. On a match
/// the stored entry takes every field of the new one (including the SKU's
/// casing) and keeps its position.
pub fn upsert(list: &mut Vec<Product>, product: &Product) -> bool {
    let Some(product) = sanitize(product) else {
        return false;
    };

    let key = product.sku_key();
    match list.iter_mut().find(|p| p.sku_key() == key) {
        Some(existing) => *existing = product,
        None => list.push(product),
    }
    true
}

/// Removes every entry whose SKU matches case-insensitively.
///
/// Returns `true` when something was removed.
pub fn remove(list: &mut Vec<Product>, sku: &str) -> bool {
    let key = sku.trim().to_lowercase();
    let before = list.len();
    list.retain(|p| p.sku_key() != key);
    list.len() != before
}

/// Suggestion search: case-insensitive substring match on SKU or name.
///
/// An empty query yields no suggestions.
pub fn search<'a>(list: &'a [Product], query: &str, limit: usize) -> Vec<&'a Product> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    list.iter()
        .filter(|p| p.sku.to_lowercase().contains(&query) || p.name.to_lowercase().contains(&query))
        .take(limit)
        .collect()
}

/// Checks that editing the entry at `index` to `sku` would not collide with
/// another entry.
///
/// Used by the catalog editor before committing an inline SKU change; the
/// store itself only de-duplicates by overwriting.
pub fn find_duplicate_sku(list: &[Product], index: usize, sku: &str) -> ValidationResult<()> {
    let key = sku.trim().to_lowercase();
    let clash = list
        .iter()
        .enumerate()
        .any(|(i, p)| i != index && p.sku_key() == key);

    if clash {
        return Err(ValidationError::Duplicate {
            field: "sku".to_string(),
            value: sku.trim().to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
