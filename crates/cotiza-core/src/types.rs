//! # Domain Types
//!
//! Core domain types used throughout Cotiza.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    SaleQuote    │   │   RepairQuote   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sku (identity) │   │  id             │   │  id             │       │
//! │  │  name           │   │  client         │   │  client         │       │
//! │  │  price          │   │  items ─────┐   │   │  equipments ─┐  │       │
//! │  └────────┬────────┘   │  discount   │   │   │  items (flat)│  │       │
//! │           │            │  shipping   │   │   │  subtotal    │  │       │
//! │           │            │  finalTotal │   │   │  finalTotal  │  │       │
//! │           ▼            └─────────────┼───┘   └──────────────┼──┘       │
//! │  ┌─────────────────┐                 │      ┌───────────────▼─┐        │
//! │  │    LineItem     │◄────────────────┘      │    Equipment    │        │
//! │  │  sku,name,price │◄───────────────────────│  repuestos      │        │
//! │  │  qty (>= 1)     │                        │  manoObra       │        │
//! │  └─────────────────┘                        └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persisted Shape
//! Field names follow the stored JSON (`quoteNumber`, `clientName`,
//! `manoObra`, `repuestos`...). Records written by earlier versions of the
//! app load unchanged: optional fields default, money and discount accept
//! numbers or numeric strings, quantities are clamped to whole units >= 1,
//! and equipment ids are regenerated when missing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::id::new_id;
use crate::money::Money;
use crate::sale::{clamp_quantity, parse_quantity};

// =============================================================================
// Product
// =============================================================================

/// A catalog entry.
///
/// Identity is the lower-cased SKU; see [`Product::sku_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Stock Keeping Unit, trimmed and non-empty.
    pub sku: String,

    /// Display name, trimmed and non-empty.
    pub name: String,

    /// Unit price.
    #[ts(type = "number")]
    pub price: Money,
}

impl Product {
    /// Creates a product. No normalization happens here; see
    /// [`crate::catalog::normalize_product`] for untrusted input.
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Product {
            sku: sku.into(),
            name: name.into(),
            price,
        }
    }

    /// Case-insensitive identity key.
    pub fn sku_key(&self) -> String {
        self.sku.trim().to_lowercase()
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A priced line on a sale quote or inside an equipment's parts list.
///
/// Uses the snapshot pattern: SKU, name and price are copied from the
/// catalog when the line is added and refreshed on every re-add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    #[ts(type = "number")]
    pub price: Money,
    #[serde(default = "default_qty", deserialize_with = "lenient_qty")]
    pub qty: u32,
}

fn default_qty() -> u32 {
    1
}

// =============================================================================
// Lenient Decoding
// =============================================================================

/// Quantity written as a number (possibly fractional) or as input text.
fn lenient_qty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => clamp_quantity(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => parse_quantity(&s),
        _ => 1,
    })
}

/// Percentage written as a number or as input text; blank or garbage is 0.
pub(crate) fn lenient_percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let percent = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if percent.is_finite() { percent } else { 0.0 })
}

impl LineItem {
    /// Creates a line with quantity 1 from a catalog product.
    pub fn from_product(product: &Product) -> Self {
        LineItem {
            sku: product.sku.clone(),
            name: product.name.clone(),
            price: product.price,
            qty: 1,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.qty)
    }
}

// =============================================================================
// Equipment
// =============================================================================

/// One physical unit being repaired, with its labor and parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Equipment {
    /// Local token, only meaningful inside the owning quote.
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub marca: String,
    #[serde(default)]
    pub modelo: String,
    #[serde(default)]
    pub serie: String,
    #[serde(default)]
    pub descripcion: String,
    /// Labor charge for this unit.
    #[serde(default)]
    #[ts(type = "number")]
    pub mano_obra: Money,
    /// Parts used, in insertion order.
    #[serde(default)]
    pub repuestos: Vec<LineItem>,
}

impl Default for Equipment {
    fn default() -> Self {
        Equipment {
            id: new_id(),
            marca: String::new(),
            modelo: String::new(),
            serie: String::new(),
            descripcion: String::new(),
            mano_obra: Money::zero(),
            repuestos: Vec::new(),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Tax status of the client (Argentine AFIP categories).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum FiscalCondition {
    #[default]
    #[serde(rename = "Consumidor Final")]
    ConsumidorFinal,
    #[serde(rename = "Responsable Inscripto")]
    ResponsableInscripto,
    #[serde(rename = "Monotributista")]
    Monotributista,
    #[serde(rename = "Exento")]
    Exento,
    #[serde(rename = "No Responsable")]
    NoResponsable,
}

impl FiscalCondition {
    /// Every option, in the order the form offers them.
    pub const ALL: [FiscalCondition; 5] = [
        FiscalCondition::ConsumidorFinal,
        FiscalCondition::ResponsableInscripto,
        FiscalCondition::Monotributista,
        FiscalCondition::Exento,
        FiscalCondition::NoResponsable,
    ];

    /// Display label, identical to the stored value.
    pub const fn label(&self) -> &'static str {
        match self {
            FiscalCondition::ConsumidorFinal => "Consumidor Final",
            FiscalCondition::ResponsableInscripto => "Responsable Inscripto",
            FiscalCondition::Monotributista => "Monotributista",
            FiscalCondition::Exento => "Exento",
            FiscalCondition::NoResponsable => "No Responsable",
        }
    }
}

/// Client header shared by both quote kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientInfo {
    #[serde(rename = "clientName", default)]
    pub name: String,
    /// Phone or other contact handle.
    #[serde(rename = "clientContact", default)]
    pub contact: String,
    #[serde(rename = "clientEmail", default)]
    pub email: String,
    /// CUIT/CUIL tax id.
    #[serde(rename = "clientCuit", default)]
    pub cuit: String,
    #[serde(rename = "clientFiscal", default)]
    pub fiscal_condition: FiscalCondition,
}

impl ClientInfo {
    fn haystack_parts(&self) -> [&str; 4] {
        [&self.name, &self.contact, &self.email, &self.cuit]
    }
}

// =============================================================================
// Quote Kind
// =============================================================================

/// Discriminator stored in every record's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum QuoteKind {
    #[serde(rename = "venta")]
    Sale,
    #[serde(rename = "reparacion")]
    Repair,
}

impl QuoteKind {
    fn sale() -> Self {
        QuoteKind::Sale
    }

    fn repair() -> Self {
        QuoteKind::Repair
    }

    /// Stored tag value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            QuoteKind::Sale => "venta",
            QuoteKind::Repair => "reparacion",
        }
    }
}

// =============================================================================
// Sale Quote
// =============================================================================

/// A saved sales quote.
///
/// ## Invariant
/// `final_total = max(0, subtotal - discount% (if apply_discount) + shipping (if has_shipping))`,
/// established by [`crate::sale::SaleDraft::finalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleQuote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default = "QuoteKind::sale")]
    pub kind: QuoteKind,
    #[serde(default)]
    pub quote_number: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub client: ClientInfo,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    #[ts(type = "number")]
    pub subtotal: Money,
    #[serde(default)]
    pub apply_discount: bool,
    /// Percentage, 0–100.
    #[serde(default, deserialize_with = "lenient_percent")]
    pub discount: f64,
    #[serde(default)]
    pub has_shipping: bool,
    #[serde(default)]
    #[ts(type = "number")]
    pub shipping: Money,
    #[serde(default)]
    #[ts(type = "number")]
    pub final_total: Money,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Repair Quote
// =============================================================================

/// A saved repair estimate.
///
/// ## Invariant
/// `subtotal = Σ equipments (Σ repuestos price × qty + manoObra)` and
/// `final_total == subtotal`; repairs have no discount or shipping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RepairQuote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default = "QuoteKind::repair")]
    pub kind: QuoteKind,
    #[serde(default)]
    pub quote_number: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub client: ClientInfo,
    #[serde(default)]
    pub equipments: Vec<Equipment>,
    /// Flattened labor + parts view, for export and display only.
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    #[ts(type = "number")]
    pub subtotal: Money,
    #[serde(default)]
    #[ts(type = "number")]
    pub final_total: Money,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Quote Record
// =============================================================================

/// What a quote collection needs from its records.
///
/// Implemented by [`SaleQuote`] and [`RepairQuote`]; the storage layer is
/// generic over it.
pub trait QuoteRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The kind stored in this collection.
    const KIND: QuoteKind;

    /// Record id; empty strings count as "no id".
    fn id(&self) -> Option<&str>;

    /// Assigns the record id.
    fn set_id(&mut self, id: String);

    /// The `type` tag carried by the record.
    fn kind(&self) -> QuoteKind;

    fn quote_number(&self) -> &str;

    fn date(&self) -> NaiveDate;

    fn created_at(&self) -> DateTime<Utc>;

    fn final_total(&self) -> Money;

    /// Text the list view filters on, lower-cased.
    fn search_text(&self) -> String;

    /// Case-insensitive substring match; an empty query matches everything.
    fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty() || self.search_text().contains(&query)
    }
}

fn join_non_empty<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn non_empty_id(id: &Option<String>) -> Option<&str> {
    id.as_deref().filter(|id| !id.is_empty())
}

impl QuoteRecord for SaleQuote {
    const KIND: QuoteKind = QuoteKind::Sale;

    fn id(&self) -> Option<&str> {
        non_empty_id(&self.id)
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn kind(&self) -> QuoteKind {
        self.kind
    }

    fn quote_number(&self) -> &str {
        &self.quote_number
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn final_total(&self) -> Money {
        self.final_total
    }

    fn search_text(&self) -> String {
        let mut parts = vec![self.quote_number.as_str()];
        parts.push(&self.client.name);
        parts.push(self.kind.as_str());
        parts.extend(self.client.haystack_parts().into_iter().skip(1));
        join_non_empty(parts)
    }
}

impl QuoteRecord for RepairQuote {
    const KIND: QuoteKind = QuoteKind::Repair;

    fn id(&self) -> Option<&str> {
        non_empty_id(&self.id)
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn kind(&self) -> QuoteKind {
        self.kind
    }

    fn quote_number(&self) -> &str {
        &self.quote_number
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn final_total(&self) -> Money {
        self.final_total
    }

    fn search_text(&self) -> String {
        let equipment_text = self
            .equipments
            .iter()
            .map(|e| format!("{} {} {} {}", e.marca, e.modelo, e.serie, e.descripcion))
            .collect::<Vec<_>>()
            .join(" ");

        let mut parts = vec![self.quote_number.as_str()];
        parts.extend(self.client.haystack_parts());
        parts.push(&self.notes);
        parts.push(&equipment_text);
        join_non_empty(parts)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sku_key_is_case_insensitive() {
        let a = Product::new("Term-01", "Termostato", Money::from_cents(100));
        let b = Product::new(" term-01 ", "Termostato", Money::from_cents(100));
        assert_eq!(a.sku_key(), b.sku_key());
    }

    #[test]
    fn test_fiscal_condition_labels_match_stored_values() {
        for condition in FiscalCondition::ALL {
            assert_eq!(serde_json::to_value(condition).unwrap(), json!(condition.label()));
        }
        assert_eq!(FiscalCondition::default().label(), "Consumidor Final");
    }

    #[test]
    fn test_sale_quote_reads_stored_shape() {
        let stored = json!({
            "id": "q-1",
            "type": "venta",
            "quoteNumber": "VEN-0109-A",
            "date": "2025-09-01",
            "clientName": "Ferretería Sur",
            "clientContact": "2991234567",
            "clientEmail": "",
            "clientCuit": "",
            "clientFiscal": "Monotributista",
            "items": [{ "sku": "A", "name": "Alpha", "price": 100, "qty": 2 }],
            "subtotal": 200,
            "applyDiscount": false,
            "discount": 0,
            "hasShipping": true,
            "shipping": "15.5",
            "finalTotal": 215.5,
            "notes": "",
            "createdAt": "2025-09-01T12:00:00Z"
        });

        let quote: SaleQuote = serde_json::from_value(stored).unwrap();
        assert_eq!(quote.id(), Some("q-1"));
        assert_eq!(quote.client.fiscal_condition, FiscalCondition::Monotributista);
        assert_eq!(quote.shipping.cents(), 1550);
        assert_eq!(quote.final_total.cents(), 21550);
        assert_eq!(quote.items[0].line_total().cents(), 20000);
    }

    #[test]
    fn test_sale_quote_reads_text_discount_and_loose_quantities() {
        let quote: SaleQuote = serde_json::from_value(json!({
            "id": "q-2",
            "type": "venta",
            "date": "2025-09-01",
            "clientName": "Ana",
            "items": [
                { "sku": "A", "name": "Alpha", "price": 100, "qty": 2.5 },
                { "sku": "B", "name": "Beta", "price": 10, "qty": "3" },
                { "sku": "C", "name": "Gamma", "price": 10, "qty": "abc" },
                { "sku": "D", "name": "Delta", "price": 10, "qty": null }
            ],
            "applyDiscount": true,
            "discount": "10"
        }))
        .unwrap();

        assert_eq!(quote.discount, 10.0);
        let qtys: Vec<u32> = quote.items.iter().map(|it| it.qty).collect();
        assert_eq!(qtys, vec![2, 3, 1, 1]);

        for blank in [json!(""), json!(null), json!("x")] {
            let quote: SaleQuote = serde_json::from_value(json!({
                "date": "2025-09-01",
                "discount": blank
            }))
            .unwrap();
            assert_eq!(quote.discount, 0.0);
        }
    }

    #[test]
    fn test_sale_quote_writes_flat_client_fields() {
        let quote: SaleQuote = serde_json::from_value(json!({
            "date": "2025-09-01",
            "clientName": "Ana"
        }))
        .unwrap();

        let value = serde_json::to_value(&quote).unwrap();
        assert_eq!(value["type"], "venta");
        assert_eq!(value["clientName"], "Ana");
        assert_eq!(value["clientFiscal"], "Consumidor Final");
        assert!(value.get("id").is_none());
        assert!(value.get("client").is_none());
    }

    #[test]
    fn test_equipment_id_regenerated_when_missing() {
        let quote: RepairQuote = serde_json::from_value(json!({
            "type": "reparacion",
            "date": "2025-09-01",
            "clientName": "Juan",
            "equipments": [{ "marca": "Bacope", "manoObra": 15, "repuestos": [] }]
        }))
        .unwrap();

        assert_eq!(quote.kind, QuoteKind::Repair);
        assert!(!quote.equipments[0].id.is_empty());
        assert_eq!(quote.equipments[0].mano_obra.cents(), 1500);
    }

    #[test]
    fn test_empty_id_counts_as_missing() {
        let mut quote: SaleQuote = serde_json::from_value(json!({
            "id": "",
            "date": "2025-09-01"
        }))
        .unwrap();
        assert_eq!(quote.id(), None);

        quote.set_id("abc".to_string());
        assert_eq!(quote.id(), Some("abc"));
    }

    #[test]
    fn test_repair_search_includes_equipment() {
        let quote: RepairQuote = serde_json::from_value(json!({
            "date": "2025-09-01",
            "quoteNumber": "REP-0901-A",
            "clientName": "Juan",
            "equipments": [{ "marca": "Ushuaia", "modelo": "Zafiro", "descripcion": "no enciende" }]
        }))
        .unwrap();

        assert!(quote.matches("zafiro"));
        assert!(quote.matches("REP-0901"));
        assert!(quote.matches(""));
        assert!(!quote.matches("tria"));
    }
}
