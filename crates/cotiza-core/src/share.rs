//! # Share Text
//!
//! Plain-text quote summaries for messaging apps (`*bold*` markup).
//!
//! ## Layout
//! ```text
//! *Presupuesto de Reparación*
//! N°: REP-0901-A
//! Fecha: 2025-09-01
//! Cliente: Juan
//! Contacto: 299 555-0101          ← optional lines only when filled
//! Cond. Fiscal: Consumidor Final
//! *Equipos (1)*                   ← repairs only
//! • E1: Orbis 315 X1 — no enciende
//! *Ítems (14)*
//! • MO — Mano de obra — Orbis 315 (X1) x1 @ $ 50,00 = $ 50,00
//! ...                             ← first `item_cap` lines
//! … (2 más)
//! TOTAL: *$ 1.234,56*
//!
//! Notas: ...
//! ```

use serde::{Deserialize, Serialize};

use crate::money::CurrencyFormat;
use crate::types::{ClientInfo, LineItem, RepairQuote, SaleQuote};

/// Default number of item lines before the rest is summarized.
pub const DEFAULT_ITEM_CAP: usize = 12;

/// Share text settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShareConfig {
    pub item_cap: usize,
    pub currency: CurrencyFormat,
}

impl Default for ShareConfig {
    fn default() -> Self {
        ShareConfig {
            item_cap: DEFAULT_ITEM_CAP,
            currency: CurrencyFormat::default(),
        }
    }
}

/// Summary of a sales quote.
pub fn sale_summary(quote: &SaleQuote, config: &ShareConfig) -> String {
    let fmt = &config.currency;
    let mut lines = vec!["*Presupuesto de Venta*".to_string()];
    header_lines(&mut lines, &quote.quote_number, &quote.date.to_string(), &quote.client);
    item_lines(&mut lines, &quote.items, config);

    lines.push(format!("Subtotal: {}", fmt.format(quote.subtotal)));
    if quote.apply_discount {
        let amount = quote.subtotal.percentage(quote.discount);
        lines.push(format!("Descuento ({}%): -{}", quote.discount, fmt.format(amount)));
    }
    if quote.has_shipping {
        lines.push(format!("Envío: {}", fmt.format(quote.shipping)));
    }
    lines.push(format!("TOTAL: *{}*", fmt.format(quote.final_total)));
    notes_line(&mut lines, &quote.notes);

    lines.join("\n")
}

/// Summary of a repair estimate.
pub fn repair_summary(quote: &RepairQuote, config: &ShareConfig) -> String {
    let mut lines = vec!["*Presupuesto de Reparación*".to_string()];
    header_lines(&mut lines, &quote.quote_number, &quote.date.to_string(), &quote.client);

    lines.push(format!("*Equipos ({})*", quote.equipments.len()));
    if quote.equipments.is_empty() {
        lines.push("-".to_string());
    }
    for (i, eq) in quote.equipments.iter().enumerate() {
        let ident = [&eq.marca, &eq.modelo, &eq.serie]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let mut line = format!("• E{}: {}", i + 1, ident);
        if !eq.descripcion.is_empty() {
            line.push_str(&format!(" — {}", eq.descripcion));
        }
        lines.push(line);
    }

    item_lines(&mut lines, &quote.items, config);
    lines.push(format!("TOTAL: *{}*", config.currency.format(quote.final_total)));
    notes_line(&mut lines, &quote.notes);

    lines.join("\n")
}

fn header_lines(lines: &mut Vec<String>, number: &str, date: &str, client: &ClientInfo) {
    lines.push(format!("N°: {number}"));
    lines.push(format!("Fecha: {date}"));
    lines.push(format!("Cliente: {}", client.name));
    if !client.contact.is_empty() {
        lines.push(format!("Contacto: {}", client.contact));
    }
    if !client.email.is_empty() {
        lines.push(format!("Email: {}", client.email));
    }
    if !client.cuit.is_empty() {
        lines.push(format!("CUIT/CUIL: {}", client.cuit));
    }
    lines.push(format!("Cond. Fiscal: {}", client.fiscal_condition.label()));
}

fn item_lines(lines: &mut Vec<String>, items: &[LineItem], config: &ShareConfig) {
    let fmt = &config.currency;
    lines.push(format!("*Ítems ({})*", items.len()));
    for it in items.iter().take(config.item_cap) {
        lines.push(format!(
            "• {} — {} x{} @ {} = {}",
            it.sku,
            it.name,
            it.qty,
            fmt.format(it.price),
            fmt.format(it.line_total())
        ));
    }
    if items.len() > config.item_cap {
        lines.push(format!("… ({} más)", items.len() - config.item_cap));
    }
}

fn notes_line(lines: &mut Vec<String>, notes: &str) {
    if !notes.is_empty() {
        lines.push(format!("\nNotas: {notes}"));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::repair::RepairDraft;
    use crate::sale::SaleDraft;
    use crate::types::{Equipment, Product};
    use chrono::{NaiveDate, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn test_sale_summary() {
        let mut draft = SaleDraft::new(today());
        draft.client.name = "Ana".to_string();
        draft.client.contact = "299 555-0101".to_string();
        draft.add_product(&Product::new("A", "Alpha", Money::from_cents(10000)));
        draft.add_product(&Product::new("A", "Alpha", Money::from_cents(10000)));
        draft.apply_discount = true;
        draft.discount = 10.0;

        let text = sale_summary(&draft.finalize(Utc::now()), &ShareConfig::default());
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "*Presupuesto de Venta*");
        assert_eq!(lines[1], "N°: VEN-0109-A");
        assert!(lines.contains(&"Contacto: 299 555-0101"));
        assert!(!text.contains("Email:"));
        assert!(lines.contains(&"• A — Alpha x2 @ $ 100,00 = $ 200,00"));
        assert!(lines.contains(&"Descuento (10%): -$ 20,00"));
        assert!(!text.contains("Envío"));
        assert!(lines.contains(&"TOTAL: *$ 180,00*"));
        assert!(!text.contains("Notas"));
    }

    #[test]
    fn test_repair_summary_caps_items() {
        let mut draft = RepairDraft::new(today());
        draft.client.name = "Juan".to_string();
        draft.equipments = vec![Equipment {
            marca: "Orbis".to_string(),
            modelo: "315".to_string(),
            descripcion: "no enciende".to_string(),
            mano_obra: Money::from_cents(5000),
            ..Equipment::default()
        }];
        let id = draft.equipments[0].id.clone();
        for i in 0..4 {
            let p = Product::new(format!("P{i}"), "Parte", Money::from_cents(100));
            draft.add_part(&id, &p).unwrap();
        }

        let config = ShareConfig {
            item_cap: 3,
            ..ShareConfig::default()
        };
        let text = repair_summary(&draft.finalize(Utc::now()), &config);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "*Presupuesto de Reparación*");
        assert!(lines.contains(&"*Equipos (1)*"));
        assert!(lines.contains(&"• E1: Orbis 315 — no enciende"));
        assert!(lines.contains(&"*Ítems (5)*"));
        assert!(lines.contains(&"• MO — Mano de obra — Orbis 315 x1 @ $ 50,00 = $ 50,00"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("• P")).count(), 2);
        assert!(lines.contains(&"… (2 más)"));
        assert!(lines.contains(&"TOTAL: *$ 54,00*"));
        assert!(text.ends_with(&format!("Notas: {}", crate::repair::DEFAULT_REPAIR_NOTES)));
    }
}
