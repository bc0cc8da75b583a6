pub mod u501_import_from_sheet;
pub mod u502_sync_stock;
pub mod u503_export_to_sheet;
