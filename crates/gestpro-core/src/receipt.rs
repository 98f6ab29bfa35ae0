//! # Receipt
//!
//! Built only from a committed [`Transaction`] and the store settings, never
//! from the live cart, so a reprint always matches what was stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use ts_rs::TS;

use crate::money::{Money, FLAT_VAT_RATE};
use crate::types::{StoreSettings, Transaction};

/// One printed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// A printable sale ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Receipt {
    pub store_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub transaction_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub cashier_id: String,
    pub lines: Vec<ReceiptLine>,
    pub total_cents: i64,
    /// VAT share of the (tax-inclusive) total.
    pub vat_cents: i64,
    /// Total minus VAT share.
    pub net_cents: i64,
    pub footer: String,
}

impl Receipt {
    pub fn from_transaction(transaction: &Transaction, settings: &StoreSettings) -> Self {
        let total = transaction.total();
        let vat = total.vat_share(FLAT_VAT_RATE);

        Receipt {
            store_name: settings.name.clone(),
            address: settings.address.clone(),
            city: settings.city.clone(),
            phone: settings.phone.clone(),
            transaction_id: transaction.id.clone(),
            date: transaction.date,
            cashier_id: transaction.cashier_id.clone(),
            lines: transaction
                .items
                .iter()
                .map(|item| ReceiptLine {
                    name: item.product.name.clone(),
                    quantity: item.quantity,
                    unit_price_cents: item.product.selling_price_cents,
                    line_total_cents: item.line_total().cents(),
                })
                .collect(),
            total_cents: total.cents(),
            vat_cents: vat.cents(),
            net_cents: (total - vat).cents(),
            footer: settings.receipt_footer.clone(),
        }
    }

    /// Plain-text rendering for a 40-column ticket printer.
    pub fn render_text(&self) -> String {
        const WIDTH: usize = 40;
        let rule = "-".repeat(WIDTH);
        let mut out = String::new();

        // writing into a String cannot fail
        let _ = writeln!(out, "{:^WIDTH$}", self.store_name);
        let _ = writeln!(out, "{:^WIDTH$}", self.address);
        let _ = writeln!(out, "{:^WIDTH$}", self.city);
        let _ = writeln!(out, "{:^WIDTH$}", format!("Tel: {}", self.phone));
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Date: {}", self.date.format("%d/%m/%Y %H:%M"));
        let _ = writeln!(out, "Ticket: {}", short_id(&self.transaction_id));
        let _ = writeln!(out, "Caissier: {}", self.cashier_id);
        let _ = writeln!(out, "{}", rule);

        for line in &self.lines {
            let _ = writeln!(out, "{}", line.name);
            let left = format!(
                "  {} x {}",
                line.quantity,
                Money::from_cents(line.unit_price_cents)
            );
            let right = Money::from_cents(line.line_total_cents).to_string();
            let _ = writeln!(out, "{}{}", left, pad_right(&left, &right, WIDTH));
        }

        let _ = writeln!(out, "{}", rule);
        for (label, cents) in [
            ("Total HT", self.net_cents),
            ("TVA (20%)", self.vat_cents),
            ("TOTAL TTC", self.total_cents),
        ] {
            let right = Money::from_cents(cents).to_string();
            let _ = writeln!(out, "{}{}", label, pad_right(label, &right, WIDTH));
        }
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{:^WIDTH$}", self.footer);
        out
    }
}

/// First 8 characters of an id, uppercased, as printed on tickets.
fn short_id(id: &str) -> String {
    id.chars().take(8).collect::<String>().to_uppercase()
}

fn pad_right(left: &str, right: &str, width: usize) -> String {
    let used = left.chars().count() + right.chars().count();
    let gap = width.saturating_sub(used).max(1);
    format!("{}{}", " ".repeat(gap), right)
}

// =============================================================================
// Unit Tests
// =============================================================================
