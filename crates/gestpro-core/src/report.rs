//! # Reports
//!
//! Back-office figures computed from the in-memory store view.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  revenue_summary     Σ totals, VAT share, net, sale count               │
//! │  total_margin        Σ (sold price − current purchase price) × qty      │
//! │  inventory_value     stock at purchase price / at selling price         │
//! │  low_stock           stock < threshold                                  │
//! │  best_sellers        top N names by units sold                          │
//! │  daily_revenue       revenue per UTC day, last N days                   │
//! │  cashier_sales       one cashier's sales, newest first                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, FLAT_VAT_RATE};
use crate::types::{Product, Transaction};
use crate::view::StoreView;

/// Products below this many units are flagged.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// How many entries the best-seller chart shows.
pub const BEST_SELLER_COUNT: usize = 5;

/// How many days the revenue chart covers.
pub const REVENUE_CHART_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RevenueSummary {
    pub revenue_cents: i64,
    pub vat_cents: i64,
    pub net_cents: i64,
    pub sales_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryValue {
    /// Σ purchase price × stock.
    pub at_purchase_cents: i64,
    /// Σ selling price × stock.
    pub at_selling_cents: i64,
    /// Difference between the two.
    pub potential_margin_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BestSeller {
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyRevenue {
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub revenue_cents: i64,
}

pub fn revenue_summary(transactions: &[Transaction]) -> RevenueSummary {
    let revenue: Money = transactions.iter().map(Transaction::total).sum();
    let vat = revenue.vat_share(FLAT_VAT_RATE);
    RevenueSummary {
        revenue_cents: revenue.cents(),
        vat_cents: vat.cents(),
        net_cents: (revenue - vat).cents(),
        sales_count: transactions.len(),
    }
}

/// Gross margin over all sales.
///
/// Lines whose product has since been deleted contribute nothing, since their
/// purchase price is no longer known.
pub fn total_margin(view: &StoreView) -> Money {
    view.transactions()
        .iter()
        .flat_map(|t| t.items.iter())
        .filter_map(|item| {
            let current = view.product(item.product_id())?;
            Some((item.product.price() - current.purchase_price()).multiply_quantity(item.quantity))
        })
        .sum()
}

pub fn inventory_value(products: &[Product]) -> InventoryValue {
    let at_purchase: Money = products
        .iter()
        .map(|p| p.purchase_price().multiply_quantity(p.stock))
        .sum();
    let at_selling: Money = products
        .iter()
        .map(|p| p.price().multiply_quantity(p.stock))
        .sum();
    InventoryValue {
        at_purchase_cents: at_purchase.cents(),
        at_selling_cents: at_selling.cents(),
        potential_margin_cents: (at_selling - at_purchase).cents(),
    }
}

/// Products with fewer than `threshold` units, lowest stock first.
pub fn low_stock(products: &[Product], threshold: i64) -> Vec<&Product> {
    let mut low: Vec<&Product> = products.iter().filter(|p| p.stock < threshold).collect();
    low.sort_by_key(|p| p.stock);
    low
}

/// Top `limit` product names by units sold. Ties break alphabetically.
pub fn best_sellers(transactions: &[Transaction], limit: usize) -> Vec<BestSeller> {
    let mut units: HashMap<&str, i64> = HashMap::new();
    for item in transactions.iter().flat_map(|t| t.items.iter()) {
        *units.entry(item.product.name.as_str()).or_default() += item.quantity;
    }

    let mut ranked: Vec<BestSeller> = units
        .into_iter()
        .map(|(name, quantity)| BestSeller {
            name: name.to_string(),
            quantity,
        })
        .collect();
    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

/// Revenue for each of the `days` days ending on `today`, oldest first.
/// Days without sales are reported as zero.
pub fn daily_revenue(transactions: &[Transaction], today: DateTime<Utc>, days: i64) -> Vec<DailyRevenue> {
    let last = today.date_naive();
    (0..days)
        .rev()
        .map(|back| {
            let day = last - Duration::days(back);
            let revenue: Money = transactions
                .iter()
                .filter(|t| t.date.date_naive() == day)
                .map(Transaction::total)
                .sum();
            DailyRevenue {
                day,
                revenue_cents: revenue.cents(),
            }
        })
        .collect()
}

/// A cashier's own sales, newest first.
pub fn cashier_sales<'a>(transactions: &'a [Transaction], cashier_id: &str) -> Vec<&'a Transaction> {
    let mut mine: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.cashier_id == cashier_id)
        .collect();
    mine.sort_by(|a, b| b.date.cmp(&a.date));
    mine
}

/// Compact JSON the business-insight prompt is given as context.
pub fn advisory_context(view: &StoreView, low_stock_threshold: i64) -> serde_json::Value {
    let summary = revenue_summary(view.transactions());
    let low: Vec<_> = low_stock(view.products(), low_stock_threshold)
        .into_iter()
        .map(|p| serde_json::json!({ "name": p.name, "stock": p.stock }))
        .collect();
    let recent: Vec<_> = view
        .transactions()
        .iter()
        .take(5)
        .map(|t| {
            serde_json::json!({
                "date": t.date.to_rfc3339(),
                "total": Money::from_cents(t.total_cents).to_string(),
                "items": t.units(),
            })
        })
        .collect();

    serde_json::json!({
        "totalRevenue": Money::from_cents(summary.revenue_cents).to_string(),
        "totalMargin": total_margin(view).to_string(),
        "totalSalesCount": summary.sales_count,
        "lowStockProducts": low,
        "recentTransactions": recent,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CartItem;

    fn product(id: &str, name: &str, price: i64, cost: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: "General".to_string(),
            selling_price_cents: price,
            purchase_price_cents: cost,
            stock,
            sku: id.to_uppercase(),
            supplier_id: None,
            description: None,
            image_url: None,
        }
    }

    fn sale(id: &str, cashier: &str, date: DateTime<Utc>, lines: Vec<(Product, i64)>) -> Transaction {
        let items: Vec<CartItem> = lines
            .into_iter()
            .map(|(product, quantity)| CartItem { product, quantity })
            .collect();
        let total_cents = items.iter().map(|i| i.line_total().cents()).sum();
        Transaction {
            id: id.to_string(),
            date,
            cashier_id: cashier.to_string(),
            items,
            total_cents,
        }
    }

    fn view() -> StoreView {
        let now = Utc::now();
        let mug = product("mug", "Mug", 1000, 400, 3);
        let pen = product("pen", "Pen", 200, 50, 50);
        StoreView::from_parts(
            vec![mug.clone(), pen.clone()],
            vec![],
            vec![
                sale("t1", "alice", now - Duration::days(1), vec![(mug.clone(), 2)]),
                sale("t2", "bob", now, vec![(pen.clone(), 5), (mug, 1)]),
            ],
            None,
        )
    }

    #[test]
    fn test_revenue_summary() {
        let summary = revenue_summary(view().transactions());
        assert_eq!(summary.revenue_cents, 2000 + 1000 + 1000);
        assert_eq!(summary.vat_cents, 800);
        assert_eq!(summary.net_cents, 3200);
        assert_eq!(summary.sales_count, 2);
    }

    #[test]
    fn test_total_margin_skips_deleted_products() {
        let mut view = view();
        // mug: 3 × (1000 - 400) = 1800, pen: 5 × (200 - 50) = 750
        assert_eq!(total_margin(&view).cents(), 2550);

        view.remove_product("pen");
        assert_eq!(total_margin(&view).cents(), 1800);
    }

    #[test]
    fn test_inventory_value() {
        let value = inventory_value(view().products());
        assert_eq!(value.at_purchase_cents, 3 * 400 + 50 * 50);
        assert_eq!(value.at_selling_cents, 3 * 1000 + 50 * 200);
        assert_eq!(
            value.potential_margin_cents,
            value.at_selling_cents - value.at_purchase_cents
        );
    }

    #[test]
    fn test_low_stock_threshold() {
        let view = view();
        let low = low_stock(view.products(), DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, "mug");
    }

    #[test]
    fn test_best_sellers_ranked_by_units() {
        let ranked = best_sellers(view().transactions(), BEST_SELLER_COUNT);
        assert_eq!(ranked[0], BestSeller { name: "Pen".to_string(), quantity: 5 });
        assert_eq!(ranked[1], BestSeller { name: "Mug".to_string(), quantity: 3 });
    }

    #[test]
    fn test_daily_revenue_fills_empty_days() {
        let view = view();
        let days = daily_revenue(view.transactions(), Utc::now(), REVENUE_CHART_DAYS);
        assert_eq!(days.len(), 7);
        assert_eq!(days[6].revenue_cents, 2000);
        assert_eq!(days[5].revenue_cents, 2000);
        assert_eq!(days[0].revenue_cents, 0);
    }

    #[test]
    fn test_cashier_sales() {
        let view = view();
        let mine = cashier_sales(view.transactions(), "alice");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "t1");
    }

    #[test]
    fn test_advisory_context_shape() {
        let ctx = advisory_context(&view(), DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(ctx["totalSalesCount"], 2);
        assert_eq!(ctx["lowStockProducts"].as_array().map(Vec::len), Some(1));
        assert_eq!(ctx["recentTransactions"].as_array().map(Vec::len), Some(2));
    }
}
