//! # Sale Aggregator
//!
//! Line-item composition and totals for sales quotes.
//!
//! ## Totals Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sale Totals                                      │
//! │                                                                         │
//! │  items ──► subtotal = Σ price × qty                                     │
//! │                │                                                        │
//! │                ├── applyDiscount? ──► discountAmount = subtotal × d%    │
//! │                │                      (else 0, whatever d holds)        │
//! │                │                                                        │
//! │                ├── hasShipping?   ──► + shipping (else 0)               │
//! │                ▼                                                        │
//! │  finalTotal = max(0, subtotal - discountAmount + shipping)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The free functions operate on a plain `Vec<LineItem>`; [`SaleDraft`] wraps
//! them as the working state of the sale form, which is what the draft cache
//! persists and what [`SaleDraft::finalize`] turns into a [`SaleQuote`].

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{ClientInfo, LineItem, Product, QuoteKind, SaleQuote};
use crate::validation::{
    validate_client_name, validate_discount, validate_quote_date,
};

// =============================================================================
// Line Operations
// =============================================================================

/// Adds one unit of `product`, or increments the existing line with the same
/// SKU.
///
/// The catalog always wins: an existing line takes the product's current
/// price and name.
pub fn add_or_increment(items: &mut Vec<LineItem>, product: &Product) {
    match items.iter_mut().find(|it| it.sku == product.sku) {
        Some(item) => {
            item.qty = item.qty.saturating_add(1);
            item.price = product.price;
            item.name = product.name.clone();
        }
        None => items.push(LineItem::from_product(product)),
    }
}

/// Sets the quantity of the line with `sku`, clamped to at least 1.
pub fn set_quantity(items: &mut [LineItem], sku: &str, value: f64) {
    let qty = clamp_quantity(value);
    if let Some(item) = items.iter_mut().find(|it| it.sku == sku) {
        item.qty = qty;
    }
}

/// Removes the line with `sku`, if any.
pub fn remove(items: &mut Vec<LineItem>, sku: &str) {
    items.retain(|it| it.sku != sku);
}

/// Clamps a raw quantity: NaN, infinities and anything below 1 become 1;
/// fractions are truncated.
pub fn clamp_quantity(value: f64) -> u32 {
    if !value.is_finite() || value < 1.0 {
        return 1;
    }
    value.min(u32::MAX as f64) as u32
}

/// Parses a quantity typed by the user. Garbage becomes 1.
pub fn parse_quantity(input: &str) -> u32 {
    clamp_quantity(input.trim().parse::<f64>().unwrap_or(f64::NAN))
}

// =============================================================================
// Totals
// =============================================================================

/// Discount and shipping toggles of a sale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SaleOptions {
    pub apply_discount: bool,
    /// Percentage, 0–100.
    pub discount: f64,
    pub has_shipping: bool,
    pub shipping: Money,
}

impl SaleOptions {
    /// Discount percentage that actually applies (0 when disabled).
    pub fn effective_discount(&self) -> f64 {
        if self.apply_discount && self.discount.is_finite() {
            self.discount
        } else {
            0.0
        }
    }

    /// Shipping that actually applies (0 when disabled).
    pub fn effective_shipping(&self) -> Money {
        if self.has_shipping {
            self.shipping
        } else {
            Money::zero()
        }
    }
}

/// Derived totals of a sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub final_total: Money,
}

/// Computes subtotal, discount amount and final total.
///
/// ## Example
/// ```rust
/// use cotiza_core::money::Money;
/// use cotiza_core::sale::{compute_totals, SaleOptions};
/// use cotiza_core::types::LineItem;
///
/// let items = vec![
///     LineItem { sku: "A".into(), name: "A".into(), price: Money::from_cents(10000), qty: 2 },
///     LineItem { sku: "B".into(), name: "B".into(), price: Money::from_cents(5000), qty: 1 },
/// ];
/// let totals = compute_totals(&items, &SaleOptions {
///     apply_discount: true,
///     discount: 10.0,
///     has_shipping: true,
///     shipping: Money::from_cents(2000),
/// });
/// assert_eq!(totals.subtotal.cents(), 25000);
/// assert_eq!(totals.discount_amount.cents(), 2500);
/// assert_eq!(totals.final_total.cents(), 24500);
/// ```
pub fn compute_totals(items: &[LineItem], options: &SaleOptions) -> SaleTotals {
    let subtotal: Money = items.iter().map(LineItem::line_total).sum();
    let discount_amount = subtotal.percentage(options.effective_discount());
    let final_total = (subtotal - discount_amount + options.effective_shipping()).max_zero();

    SaleTotals {
        subtotal,
        discount_amount,
        final_total,
    }
}

/// Default sale quote number: `VEN-DDMM-A`.
pub fn default_sale_number(date: NaiveDate) -> String {
    format!("VEN-{:02}{:02}-A", date.day(), date.month())
}

// =============================================================================
// Sale Draft
// =============================================================================

/// Working state of the sale form.
///
/// Serialized as-is into the sale draft slot on every edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleDraft {
    /// Set when the draft reopens a saved quote; re-saving replaces it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub quote_number: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub client: ClientInfo,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub apply_discount: bool,
    #[serde(default, deserialize_with = "crate::types::lenient_percent")]
    pub discount: f64,
    #[serde(default)]
    pub has_shipping: bool,
    #[serde(default)]
    #[ts(type = "number")]
    pub shipping: Money,
    #[serde(default)]
    pub notes: String,
}

impl SaleDraft {
    /// Blank form dated `today`, with the default quote number.
    pub fn new(today: NaiveDate) -> Self {
        SaleDraft {
            id: None,
            quote_number: default_sale_number(today),
            date: today,
            client: ClientInfo::default(),
            items: Vec::new(),
            apply_discount: false,
            discount: 0.0,
            has_shipping: false,
            shipping: Money::zero(),
            notes: String::new(),
        }
    }

    /// Reopens a saved quote for editing.
    pub fn from_quote(quote: &SaleQuote) -> Self {
        SaleDraft {
            id: quote.id.clone(),
            quote_number: quote.quote_number.clone(),
            date: quote.date,
            client: quote.client.clone(),
            items: quote.items.clone(),
            apply_discount: quote.apply_discount,
            discount: quote.discount,
            has_shipping: quote.has_shipping,
            shipping: quote.shipping,
            notes: quote.notes.clone(),
        }
    }

    pub fn add_product(&mut self, product: &Product) {
        add_or_increment(&mut self.items, product);
    }

    pub fn set_quantity(&mut self, sku: &str, value: f64) {
        set_quantity(&mut self.items, sku, value);
    }

    pub fn remove_item(&mut self, sku: &str) {
        remove(&mut self.items, sku);
    }

    pub fn options(&self) -> SaleOptions {
        SaleOptions {
            apply_discount: self.apply_discount,
            discount: self.discount,
            has_shipping: self.has_shipping,
            shipping: self.shipping,
        }
    }

    pub fn totals(&self) -> SaleTotals {
        compute_totals(&self.items, &self.options())
    }

    /// Checks whether the quote may be saved, exported or shared.
    ///
    /// ## Rules
    /// - Client name present
    /// - At least one item
    /// - Date between today and +50 days
    /// - Discount within 0–100 when enabled
    pub fn check_ready(&self, today: NaiveDate) -> CoreResult<()> {
        validate_client_name(&self.client.name)?;
        if self.items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }
        validate_quote_date(self.date, today)?;
        if self.apply_discount {
            validate_discount(self.discount)?;
        }
        Ok(())
    }

    /// Snapshots the draft into a quote record with freshly computed totals.
    ///
    /// Disabled discount/shipping are stored as 0 so the record is
    /// self-consistent.
    pub fn finalize(&self, now: DateTime<Utc>) -> SaleQuote {
        let options = self.options();
        let totals = compute_totals(&self.items, &options);

        SaleQuote {
            id: self.id.clone(),
            kind: QuoteKind::Sale,
            quote_number: self.quote_number.clone(),
            date: self.date,
            client: self.client.clone(),
            items: self.items.clone(),
            subtotal: totals.subtotal,
            apply_discount: self.apply_discount,
            discount: options.effective_discount(),
            has_shipping: self.has_shipping,
            shipping: options.effective_shipping(),
            final_total: totals.final_total,
            notes: self.notes.clone(),
            created_at: now,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn product(sku: &str, cents: i64) -> Product {
        Product::new(sku, format!("Producto {sku}"), Money::from_cents(cents))
    }

    fn item(sku: &str, cents: i64, qty: u32) -> LineItem {
        LineItem {
            sku: sku.to_string(),
            name: sku.to_string(),
            price: Money::from_cents(cents),
            qty,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn test_add_or_increment_refreshes_price() {
        let mut items = Vec::new();
        add_or_increment(&mut items, &product("A", 1000));
        add_or_increment(&mut items, &Product::new("A", "Renamed", Money::from_cents(1200)));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].qty, 2);
        assert_eq!(items[0].price.cents(), 1200);
        assert_eq!(items[0].name, "Renamed");
    }

    #[test]
    fn test_set_quantity_clamps() {
        let mut items = vec![item("A", 100, 3)];

        set_quantity(&mut items, "A", 0.0);
        assert_eq!(items[0].qty, 1);
        set_quantity(&mut items, "A", f64::NAN);
        assert_eq!(items[0].qty, 1);
        set_quantity(&mut items, "A", 4.7);
        assert_eq!(items[0].qty, 4);
        set_quantity(&mut items, "missing", 9.0);
        assert_eq!(items[0].qty, 4);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("5"), 5);
        assert_eq!(parse_quantity(" 2 "), 2);
        assert_eq!(parse_quantity("abc"), 1);
        assert_eq!(parse_quantity("-3"), 1);
        assert_eq!(parse_quantity(""), 1);
    }

    #[test]
    fn test_remove() {
        let mut items = vec![item("A", 100, 1), item("B", 200, 1)];
        remove(&mut items, "A");
        remove(&mut items, "Z");
        assert_eq!(items, vec![item("B", 200, 1)]);
    }

    #[test]
    fn test_compute_totals_example() {
        let items = vec![item("A", 10000, 2), item("B", 5000, 1)];
        let totals = compute_totals(
            &items,
            &SaleOptions {
                apply_discount: true,
                discount: 10.0,
                has_shipping: true,
                shipping: Money::from_cents(2000),
            },
        );

        assert_eq!(totals.subtotal.cents(), 25000);
        assert_eq!(totals.discount_amount.cents(), 2500);
        assert_eq!(totals.final_total.cents(), 24500);
    }

    #[test]
    fn test_compute_totals_with_huge_prices() {
        let huge = Product::new("BIG", "Galpón", Money::from_major(1e17));
        let mut items = Vec::new();
        add_or_increment(&mut items, &huge);
        add_or_increment(&mut items, &huge);
        items.push(item("B", 100, 3));

        let totals = compute_totals(
            &items,
            &SaleOptions {
                apply_discount: true,
                discount: 10.0,
                has_shipping: true,
                shipping: Money::from_cents(2000),
            },
        );

        assert_eq!(totals.subtotal.cents(), i64::MAX);
        assert!(totals.discount_amount.is_positive());
        assert!(totals.final_total.is_positive());
        assert!(totals.final_total < totals.subtotal);
    }

    #[test]
    fn test_disabled_toggles_ignore_values() {
        let items = vec![item("A", 10000, 1)];
        let off = SaleOptions {
            apply_discount: false,
            discount: 50.0,
            has_shipping: false,
            shipping: Money::from_cents(99999),
        };
        let totals = compute_totals(&items, &off);
        assert_eq!(totals.discount_amount, Money::zero());
        assert_eq!(totals.final_total.cents(), 10000);

        let other = SaleOptions {
            discount: 5.0,
            shipping: Money::from_cents(1),
            ..off
        };
        assert_eq!(compute_totals(&items, &other), totals);
    }

    #[test]
    fn test_final_total_never_negative() {
        let items = vec![item("A", 1000, 1)];
        let totals = compute_totals(
            &items,
            &SaleOptions {
                apply_discount: true,
                discount: 150.0,
                ..SaleOptions::default()
            },
        );
        assert_eq!(totals.final_total, Money::zero());
    }

    #[test]
    fn test_default_sale_number() {
        assert_eq!(default_sale_number(today()), "VEN-0109-A");
    }

    #[test]
    fn test_check_ready() {
        let mut draft = SaleDraft::new(today());
        assert!(matches!(
            draft.check_ready(today()),
            Err(CoreError::NotReady(ValidationError::Required { .. }))
        ));

        draft.client.name = "Ana".to_string();
        assert_eq!(
            draft.check_ready(today()),
            Err(CoreError::NotReady(ValidationError::Required {
                field: "items".to_string()
            }))
        );

        draft.add_product(&product("A", 100));
        assert!(draft.check_ready(today()).is_ok());

        draft.apply_discount = true;
        draft.discount = 120.0;
        assert!(matches!(
            draft.check_ready(today()),
            Err(CoreError::NotReady(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_finalize_computes_totals() {
        let mut draft = SaleDraft::new(today());
        draft.client.name = "Ana".to_string();
        draft.add_product(&product("A", 10000));
        draft.add_product(&product("A", 10000));
        draft.add_product(&product("B", 5000));
        draft.apply_discount = true;
        draft.discount = 10.0;
        draft.shipping = Money::from_cents(2000);

        let now = Utc::now();
        let quote = draft.finalize(now);

        assert_eq!(quote.kind, QuoteKind::Sale);
        assert_eq!(quote.id, None);
        assert_eq!(quote.subtotal.cents(), 25000);
        // shipping toggle is off: stored as 0 and not added
        assert_eq!(quote.shipping, Money::zero());
        assert_eq!(quote.final_total.cents(), 22500);
        assert_eq!(quote.created_at, now);

        let reopened = SaleDraft::from_quote(&quote);
        assert_eq!(reopened.items, draft.items);
    }
}
