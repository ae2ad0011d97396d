//! # Repair Aggregator
//!
//! Equipment-based composition for repair estimates.
//!
//! ## Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Repair Estimate                                  │
//! │                                                                         │
//! │  Equipment E1 ── manoObra ───────────────┐                              │
//! │              └── repuestos [price × qty] ┼──► E1 total                  │
//! │  Equipment E2 ── ...                     │                              │
//! │                                          ▼                              │
//! │                    subtotal = Σ equipment totals = finalTotal           │
//! │                                                                         │
//! │  flatten():                                                             │
//! │    E1 labor  ──► { sku: "MO", name: "Mano de obra — marca modelo" }   │
//! │    E1 parts  ──► { sku, name: "name — marca modelo", price, qty }       │
//! │    E2 ...                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The flattened list is a derived view for display, export and sharing;
//! the equipment list stays the source of truth.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::sale;
use crate::types::{ClientInfo, Equipment, LineItem, Product, QuoteKind, RepairQuote};
use crate::validation::{validate_client_name, validate_quote_date};

/// SKU of the synthetic labor line produced by [`flatten`].
pub const LABOR_SKU: &str = "MO";

/// Notes pre-filled on a new repair estimate.
pub const DEFAULT_REPAIR_NOTES: &str =
    "Este presupuesto posee una validez de 7 días a partir de su emisión.";

// =============================================================================
// Totals
// =============================================================================

/// Σ price × qty over an equipment's parts.
pub fn parts_subtotal(equipment: &Equipment) -> Money {
    equipment.repuestos.iter().map(LineItem::line_total).sum()
}

/// Parts plus labor for one equipment.
pub fn equipment_total(equipment: &Equipment) -> Money {
    parts_subtotal(equipment) + equipment.mano_obra
}

/// Σ equipment totals. Repairs carry no discount or shipping, so this is
/// also the final total.
pub fn repair_subtotal(equipments: &[Equipment]) -> Money {
    equipments.iter().map(equipment_total).sum()
}

/// Flattens equipment into display lines: per equipment, a labor line
/// (only when labor is positive) followed by its parts.
///
/// ## Example
/// ```rust
/// use cotiza_core::money::Money;
/// use cotiza_core::repair::flatten;
/// use cotiza_core::types::Equipment;
///
/// let eq = Equipment {
///     marca: "Orbis".into(),
///     modelo: "315".into(),
///     serie: "X1".into(),
///     mano_obra: Money::from_cents(5000),
///     ..Equipment::default()
/// };
/// let items = flatten(&[eq]);
/// assert_eq!(items[0].sku, "MO");
/// assert_eq!(items[0].name, "Mano de obra — Orbis 315 (X1)");
/// ```
pub fn flatten(equipments: &[Equipment]) -> Vec<LineItem> {
    let mut items = Vec::new();

    for eq in equipments {
        if eq.mano_obra.is_positive() {
            let serie = if eq.serie.is_empty() {
                String::new()
            } else {
                format!("({})", eq.serie)
            };
            items.push(LineItem {
                sku: LABOR_SKU.to_string(),
                name: format!("Mano de obra — {} {} {}", eq.marca, eq.modelo, serie)
                    .trim()
                    .to_string(),
                price: eq.mano_obra,
                qty: 1,
            });
        }

        for part in &eq.repuestos {
            items.push(LineItem {
                sku: part.sku.clone(),
                name: format!("{} — {} {}", part.name, eq.marca, eq.modelo)
                    .trim()
                    .to_string(),
                price: part.price,
                qty: part.qty.max(1),
            });
        }
    }

    items
}

/// Default repair quote number: `REP-MMDD-A`.
pub fn default_repair_number(date: NaiveDate) -> String {
    format!("REP-{:02}{:02}-A", date.month(), date.day())
}

// =============================================================================
// Equipment Parts
// =============================================================================

impl Equipment {
    /// Adds one unit of `product` to this equipment's parts, refreshing the
    /// price and name of an existing line.
    pub fn add_part(&mut self, product: &Product) {
        sale::add_or_increment(&mut self.repuestos, product);
    }

    /// Sets a part's quantity, clamped to at least 1.
    pub fn set_part_quantity(&mut self, sku: &str, value: f64) {
        sale::set_quantity(&mut self.repuestos, sku, value);
    }

    pub fn remove_part(&mut self, sku: &str) {
        sale::remove(&mut self.repuestos, sku);
    }

    /// Whether any of marca, modelo, serie or descripcion is filled in.
    pub fn is_identified(&self) -> bool {
        [&self.marca, &self.modelo, &self.serie, &self.descripcion]
            .iter()
            .any(|s| !s.trim().is_empty())
    }

    /// Whether the equipment has something to charge for.
    pub fn is_billable(&self) -> bool {
        !self.repuestos.is_empty() || self.mano_obra.is_positive()
    }
}

// =============================================================================
// Repair Draft
// =============================================================================

/// Working state of the repair form.
///
/// Older drafts stored the equipment list under `equipos`; both names load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RepairDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub quote_number: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub client: ClientInfo,
    #[serde(default, alias = "equipos")]
    pub equipments: Vec<Equipment>,
    #[serde(default)]
    pub notes: String,
}

impl RepairDraft {
    /// Blank form dated `today` with a single empty equipment.
    pub fn new(today: NaiveDate) -> Self {
        RepairDraft {
            id: None,
            quote_number: default_repair_number(today),
            date: today,
            client: ClientInfo::default(),
            equipments: vec![Equipment::default()],
            notes: DEFAULT_REPAIR_NOTES.to_string(),
        }
    }

    /// Reopens a saved estimate for editing.
    pub fn from_quote(quote: &RepairQuote) -> Self {
        RepairDraft {
            id: quote.id.clone(),
            quote_number: quote.quote_number.clone(),
            date: quote.date,
            client: quote.client.clone(),
            equipments: quote.equipments.clone(),
            notes: quote.notes.clone(),
        }
    }

    /// Appends a blank equipment and returns its id.
    pub fn add_equipment(&mut self) -> String {
        let eq = Equipment::default();
        let id = eq.id.clone();
        self.equipments.push(eq);
        id
    }

    /// Removes an equipment. Returns `false` if the id is unknown.
    pub fn remove_equipment(&mut self, id: &str) -> bool {
        let before = self.equipments.len();
        self.equipments.retain(|e| e.id != id);
        self.equipments.len() != before
    }

    pub fn equipment_mut(&mut self, id: &str) -> CoreResult<&mut Equipment> {
        self.equipments
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| CoreError::EquipmentNotFound(id.to_string()))
    }

    pub fn add_part(&mut self, equipment_id: &str, product: &Product) -> CoreResult<()> {
        self.equipment_mut(equipment_id)?.add_part(product);
        Ok(())
    }

    pub fn set_part_quantity(&mut self, equipment_id: &str, sku: &str, value: f64) -> CoreResult<()> {
        self.equipment_mut(equipment_id)?.set_part_quantity(sku, value);
        Ok(())
    }

    pub fn remove_part(&mut self, equipment_id: &str, sku: &str) -> CoreResult<()> {
        self.equipment_mut(equipment_id)?.remove_part(sku);
        Ok(())
    }

    pub fn subtotal(&self) -> Money {
        repair_subtotal(&self.equipments)
    }

    /// Flattened display lines.
    pub fn items(&self) -> Vec<LineItem> {
        flatten(&self.equipments)
    }

    /// Checks whether the estimate may be saved, exported or shared.
    ///
    /// ## Rules
    /// - Client name present
    /// - Date between today and +50 days
    /// - Every equipment identified (marca, modelo, serie or descripcion)
    /// - Every equipment billable (parts, or labor > 0)
    /// - Subtotal > 0
    pub fn check_ready(&self, today: NaiveDate) -> CoreResult<()> {
        validate_client_name(&self.client.name)?;
        validate_quote_date(self.date, today)?;

        for (i, eq) in self.equipments.iter().enumerate() {
            if !eq.is_identified() {
                return Err(ValidationError::Required {
                    field: format!("equipment {} description", i + 1),
                }
                .into());
            }
            if !eq.is_billable() {
                return Err(ValidationError::Required {
                    field: format!("equipment {} labor or parts", i + 1),
                }
                .into());
            }
        }

        if !self.subtotal().is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "subtotal".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Snapshots the draft into a repair record with computed totals and
    /// the flattened item view.
    pub fn finalize(&self, now: DateTime<Utc>) -> RepairQuote {
        let subtotal = self.subtotal();

        RepairQuote {
            id: self.id.clone(),
            kind: QuoteKind::Repair,
            quote_number: self.quote_number.clone(),
            date: self.date,
            client: self.client.clone(),
            equipments: self.equipments.clone(),
            items: self.items(),
            subtotal,
            final_total: subtotal,
            notes: self.notes.clone(),
            created_at: now,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
