//! Reconcile in-memory stock against the connected sheet.
//!
//! One read, minimal writes: the sheet grid is fetched once, a code→row
//! index is built from it, and only cells whose value actually differs are
//! rewritten, one cell per drifted product. Sheet structure is never
//! touched: no rows are created or deleted here.

use std::collections::HashMap;

use contracts::usecases::u502_sync_stock::SyncSummary;

use crate::domain::a001_product::ProductStore;
use crate::shared::sheets::{a1_cell, resolve_headers, SheetColumn, SheetsApi, SheetsError};

/// Map product code → 1-based sheet row. The first occurrence of a code
/// wins; later duplicates are ignored.
fn build_row_index(
    rows: &[Vec<String>],
    first_data_row: usize,
    code_col: usize,
) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (offset, row) in rows.iter().enumerate().skip(first_data_row) {
        let code = row.get(code_col).map(|c| c.trim()).unwrap_or_default();
        if code.is_empty() {
            continue;
        }
        index.entry(code.to_string()).or_insert(offset + 1);
    }
    index
}

pub async fn sync_stock(
    api: &dyn SheetsApi,
    store: &ProductStore,
) -> Result<SyncSummary, SheetsError> {
    let rows = api.get_all_values().await?;
    let resolved = resolve_headers(&rows)?;
    let code_col = resolved.columns.require(SheetColumn::Code)?;
    let stock_col = resolved.columns.require(SheetColumn::Stock)?;

    let index = build_row_index(&rows, resolved.first_data_row, code_col);
    tracing::debug!("Row index built: {} codes in sheet", index.len());

    let mut summary = SyncSummary {
        unknown_rows: index.keys().filter(|code| !store.contains(code)).count(),
        ..Default::default()
    };

    for product in store.iter() {
        let code = product.code.as_str();
        let Some(&row_number) = index.get(code) else {
            tracing::warn!("Product {} has no row in the sheet", code);
            summary.not_found += 1;
            continue;
        };

        // Compare as trimmed strings; a missing cell counts as empty
        let sheet_value = rows[row_number - 1]
            .get(stock_col)
            .map(|c| c.trim())
            .unwrap_or_default();
        let desired = product.stock.to_string();
        if sheet_value == desired {
            summary.unchanged += 1;
            continue;
        }

        let cell = a1_cell(row_number, stock_col);
        tracing::info!("Updating {}: {} -> {} ({})", code, sheet_value, desired, cell);
        match api.update_range(&cell, vec![vec![desired.clone()]]).await {
            Ok(()) => summary.updated += 1,
            Err(primary) => {
                tracing::warn!(
                    "Range update for {} failed ({}), retrying as single cell",
                    code,
                    primary
                );
                match api.update_cell(&cell, &desired).await {
                    Ok(()) => summary.updated += 1,
                    Err(fallback) => {
                        tracing::error!("Cell update for {} failed too: {}", code, fallback);
                        summary.failed.push(code.to_string());
                    }
                }
            }
        }
    }

    tracing::info!("Sync finished: {}", summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::sheets::testing::FakeSheets;
    use contracts::domain::a001_product::{Product, ProductCode};

    fn store_with(entries: &[(&str, u32)]) -> ProductStore {
        let mut store = ProductStore::new();
        for (code, stock) in entries {
            let mut p = Product::new_for_insert(
                ProductCode::new(*code),
                format!("Producto {code}"),
                0,
                String::new(),
            );
            p.stock = *stock;
            store.upsert(p).unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_matching_values_issue_no_writes() {
        let api = FakeSheets::with_rows(&[
            &["Título", "Codigo", "Stock"],
            &["A", "123", "5"],
        ]);
        let store = store_with(&[("123", 5)]);

        let summary = sync_stock(&api, &store).await.unwrap();
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.updated, 0);
        assert_eq!(api.range_update_count(), 0);
        assert_eq!(api.cell_update_count(), 0);
    }

    #[tokio::test]
    async fn test_drifted_value_writes_exactly_one_cell() {
        // Scenario: memory says 7, sheet says 5 -> one write to the stock
        // column of row 2, one update reported, nothing not-found.
        let api = FakeSheets::with_rows(&[
            &["Título", "Codigo", "Stock"],
            &["A", "123", "5"],
        ]);
        let store = store_with(&[("123", 7)]);

        let summary = sync_stock(&api, &store).await.unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.not_found, 0);

        let writes = api.range_updates.lock().unwrap();
        assert_eq!(writes.len(), 1);
        let (range, values) = &writes[0];
        assert_eq!(range, "C2");
        assert_eq!(values, &vec![vec!["7".to_string()]]);
    }

    #[tokio::test]
    async fn test_header_row_below_preamble() {
        let api = FakeSheets::with_rows(&[
            &["Inventario general", ""],
            &["Codigo", "Stock"],
            &["123", "1"],
        ]);
        let store = store_with(&[("123", 2)]);

        let summary = sync_stock(&api, &store).await.unwrap();
        assert_eq!(summary.updated, 1);
        let writes = api.range_updates.lock().unwrap();
        assert_eq!(writes[0].0, "B3");
    }

    #[tokio::test]
    async fn test_preamble_mentioning_stock_is_taken_as_header_row() {
        // The first row containing "stock" or "codigo" wins, even when it is
        // prose; resolution then aborts for lack of a code column.
        let api = FakeSheets::with_rows(&[
            &["Planilla de stock", ""],
            &["Codigo", "Stock"],
            &["123", "1"],
        ]);
        let store = store_with(&[("123", 2)]);
        assert!(matches!(
            sync_stock(&api, &store).await,
            Err(SheetsError::ColumnNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_codes_resolve_to_first_row() {
        let api = FakeSheets::with_rows(&[
            &["Codigo", "Stock"],
            &["123", "1"],
            &["123", "9"],
        ]);
        let store = store_with(&[("123", 4)]);

        let summary = sync_stock(&api, &store).await.unwrap();
        assert_eq!(summary.updated, 1);
        let writes = api.range_updates.lock().unwrap();
        assert_eq!(writes[0].0, "B2", "first occurrence wins");
    }

    #[tokio::test]
    async fn test_counts_products_missing_from_sheet_and_unknown_rows() {
        let api = FakeSheets::with_rows(&[
            &["Codigo", "Stock"],
            &["123", "5"],
            &["777", "1"],
        ]);
        let store = store_with(&[("123", 5), ("456", 2)]);

        let summary = sync_stock(&api, &store).await.unwrap();
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.unknown_rows, 1);
        assert_eq!(api.range_update_count(), 0, "structure never changes");
    }

    #[tokio::test]
    async fn test_failed_primary_write_falls_back_to_single_cell() {
        let mut api = FakeSheets::with_rows(&[
            &["Codigo", "Stock"],
            &["123", "5"],
        ]);
        api.fail_range_updates = true;
        let store = store_with(&[("123", 7)]);

        let summary = sync_stock(&api, &store).await.unwrap();
        assert_eq!(summary.updated, 1);
        assert!(summary.failed.is_empty());
        let cells = api.cell_updates.lock().unwrap();
        assert_eq!(cells.as_slice(), &[("B2".to_string(), "7".to_string())]);
    }

    #[tokio::test]
    async fn test_double_write_failure_skips_product_but_continues() {
        let mut api = FakeSheets::with_rows(&[
            &["Codigo", "Stock"],
            &["123", "5"],
            &["456", "1"],
        ]);
        api.fail_range_updates = true;
        api.fail_cell_updates = true;
        let store = store_with(&[("123", 7), ("456", 1)]);

        let summary = sync_stock(&api, &store).await.unwrap();
        assert_eq!(summary.failed, vec!["123".to_string()]);
        assert_eq!(summary.unchanged, 1, "remaining products still processed");
    }

    #[tokio::test]
    async fn test_aborts_without_headers() {
        let api = FakeSheets::with_rows(&[&["x", "y"], &["1", "2"]]);
        let store = store_with(&[("123", 7)]);
        assert!(matches!(
            sync_stock(&api, &store).await,
            Err(SheetsError::HeadersNotFound)
        ));
    }

    #[tokio::test]
    async fn test_aborts_without_stock_column() {
        let api = FakeSheets::with_rows(&[&["Codigo", "Precio Costo"], &["123", "$5"]]);
        let store = store_with(&[("123", 7)]);
        assert!(matches!(
            sync_stock(&api, &store).await,
            Err(SheetsError::ColumnNotFound("stock"))
        ));
    }
}
