use crate::shared::format::{format_money, format_number};

use super::ProductStore;

/// Snapshot of the inventory for display
#[derive(Debug, Clone, Default)]
pub struct InventoryReport {
    pub total_products: usize,
    pub low_stock_count: usize,
    pub total_value: f64,
    pub low_stock: Vec<LowStockEntry>,
}

#[derive(Debug, Clone)]
pub struct LowStockEntry {
    pub display_name: String,
    pub stock: u32,
    pub minimum_stock: u32,
}

/// Parse a unit-cost cell leniently: "$" prefixes and comma separators are
/// stripped, anything unparseable counts as zero.
pub fn parse_unit_cost(raw: &str) -> f64 {
    let cleaned = raw.trim().replace('$', "").replace(',', "");
    cleaned.parse::<f64>().unwrap_or(0.0)
}

pub fn build_report(store: &ProductStore) -> InventoryReport {
    let mut report = InventoryReport {
        total_products: store.len(),
        ..Default::default()
    };

    for product in store.iter() {
        report.total_value += f64::from(product.stock) * parse_unit_cost(&product.unit_cost);
        if product.is_low_stock() {
            report.low_stock_count += 1;
            report.low_stock.push(LowStockEntry {
                display_name: product.display_name.clone(),
                stock: product.stock,
                minimum_stock: product.minimum_stock,
            });
        }
    }
    report
}

impl std::fmt::Display for InventoryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "INVENTORY REPORT")?;
        writeln!(f, "========================")?;
        writeln!(f, "Total products: {}", format_number(self.total_products))?;
        writeln!(
            f,
            "Products below minimum: {}",
            format_number(self.low_stock_count)
        )?;
        writeln!(f, "Total inventory value: {}", format_money(self.total_value))?;
        if !self.low_stock.is_empty() {
            writeln!(f)?;
            writeln!(f, "Low stock:")?;
            for entry in &self.low_stock {
                writeln!(
                    f,
                    "  - {} (stock: {}, minimum: {})",
                    entry.display_name, entry.stock, entry.minimum_stock
                )?;
            }
        }
        Ok(())
    }
}
