//! Rebuild the product store from the connected sheet.
//!
//! The sheet is authoritative for this operation: the store is cleared and
//! repopulated row by row using the resolved header map. Only the code
//! column is required; every other field degrades to a default when its
//! column is missing.

use contracts::domain::a001_product::{Product, ProductCode};
use contracts::usecases::u501_import_from_sheet::ImportSummary;

use crate::domain::a001_product::ProductStore;
use crate::shared::sheets::{resolve_headers, SheetColumn, SheetsApi, SheetsError};

/// Parse a count cell the way the sheet is actually filled in: all-digit
/// text is a number, anything else (blank, "-", "5 aprox") counts as zero.
fn parse_count(raw: &str) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return 0;
    }
    raw.parse().unwrap_or(0)
}

fn cell(row: &[String], column: Option<usize>) -> String {
    column
        .and_then(|i| row.get(i))
        .map(|c| c.trim().to_string())
        .unwrap_or_default()
}

pub async fn import_from_sheet(
    api: &dyn SheetsApi,
    store: &mut ProductStore,
) -> Result<ImportSummary, SheetsError> {
    let rows = api.get_all_values().await?;
    let resolved = resolve_headers(&rows)?;
    let code_col = resolved.columns.require(SheetColumn::Code)?;
    let columns = &resolved.columns;

    store.clear();
    let mut summary = ImportSummary::default();

    for row in rows.iter().skip(resolved.first_data_row) {
        let code = row
            .get(code_col)
            .map(|c| c.trim())
            .unwrap_or_default();
        if code.is_empty() {
            summary.skipped += 1;
            continue;
        }
        if store.contains(code) {
            tracing::warn!("Duplicate code {} in sheet, keeping the first row", code);
            summary.skipped += 1;
            continue;
        }

        let mut product = Product::new_for_insert(
            ProductCode::new(code),
            cell(row, columns.title),
            parse_count(&cell(row, columns.min_stock)),
            cell(row, columns.unit_cost),
        );
        product.stock = parse_count(&cell(row, columns.stock));

        match store.upsert(product) {
            Ok(()) => summary.imported += 1,
            Err(e) => {
                tracing::warn!("Skipping row for code {}: {}", code, e);
                summary.skipped += 1;
            }
        }
    }

    tracing::info!("Import finished: {}", summary);
    Ok(summary)
}
