//! Rebuild the sheet from the store: clear everything, write a canonical
//! header row, append one row per product. The inverse of import, used to
//! seed an empty spreadsheet.

use crate::domain::a001_product::ProductStore;
use crate::shared::sheets::{SheetsApi, SheetsError};

/// Canonical headers; chosen so a later header resolution finds every column
const EXPORT_HEADERS: [&str; 5] = ["Título", "Codigo", "Stock", "Stock Min", "Precio Costo"];

pub async fn export_to_sheet(
    api: &dyn SheetsApi,
    store: &ProductStore,
) -> Result<usize, SheetsError> {
    api.clear().await?;
    api.append_row(EXPORT_HEADERS.iter().map(|h| h.to_string()).collect())
        .await?;

    let mut exported = 0;
    for product in store.iter() {
        api.append_row(vec![
            product.display_name.clone(),
            product.code.as_str().to_string(),
            product.stock.to_string(),
            product.minimum_stock.to_string(),
            product.unit_cost.clone(),
        ])
        .await?;
        exported += 1;
    }

    tracing::info!("Exported {} products to the sheet", exported);
    Ok(exported)
}
