//! Google Sheets access: authentication, the API client and the
//! header-resolution logic shared by import and reconciliation.

pub mod auth;
pub mod client;
pub mod error;
pub mod header;
#[cfg(test)]
pub mod testing;

pub use client::{GoogleSheetsClient, SheetsApi};
pub use error::SheetsError;
pub use header::{a1_cell, column_letter, resolve_headers, HeaderColumns, ResolvedHeaders, SheetColumn};
