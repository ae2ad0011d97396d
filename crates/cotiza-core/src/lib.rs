//! # cotiza-core: Pure Quoting Logic for Cotiza
//!
//! Catalog rules, quote composition and totals, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cotiza Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Forms (sale / repair / catalog)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cotiza-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │   sale    │  │  repair   │  │   share   │  │   │
//! │  │   │ normalize │  │ SaleDraft │  │RepairDraft│  │  summary  │  │   │
//! │  │   │  upsert   │  │  totals   │  │  flatten  │  │   text    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   types • money • validation • id • error                      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    cotiza-db (Storage Layer)                    │   │
//! │  │        key-value store, catalog, quote repositories, drafts     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, LineItem, Equipment, quotes)
//! - [`money`] - Money in integer cents, lenient JSON decoding
//! - [`catalog`] - Catalog normalization, upsert and search
//! - [`sale`] - Sale line items, totals and the sale draft
//! - [`repair`] - Equipment totals, flattening and the repair draft
//! - [`share`] - Plain-text quote summaries
//! - [`validation`] - Field and readiness rules
//! - [`id`] - Record id generation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use cotiza_core::catalog::default_products;
//! use cotiza_core::sale::SaleDraft;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
//! let catalog = default_products();
//!
//! let mut draft = SaleDraft::new(today);
//! draft.client.name = "Ana".into();
//! draft.add_product(&catalog[0]);
//! assert!(draft.check_ready(today).is_ok());
//! assert_eq!(draft.totals().final_total, catalog[0].price);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod id;
pub mod money;
pub mod repair;
pub mod sale;
pub mod share;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use id::{IdGenerator, UuidGenerator};
pub use money::{CurrencyFormat, Money};
pub use repair::RepairDraft;
pub use sale::{SaleDraft, SaleOptions, SaleTotals};
pub use share::ShareConfig;
pub use types::*;
