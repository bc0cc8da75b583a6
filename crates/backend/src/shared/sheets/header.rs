//! Header discovery for loosely structured sheets.
//!
//! The sheet is maintained by hand, so the header row is not guaranteed to
//! be row 1 and column names drift ("Código", "CODIGO", "Stock Min",
//! "StockMin", ...). Columns are located by substring rules over the
//! lowercased, trimmed header text instead of by fixed positions.

use super::SheetsError;

/// Semantic columns the tool knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetColumn {
    Title,
    Code,
    Stock,
    MinStock,
    UnitCost,
}

impl SheetColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "titulo",
            Self::Code => "codigo",
            Self::Stock => "stock",
            Self::MinStock => "stock min",
            Self::UnitCost => "precio costo",
        }
    }
}

/// Semantic column name → zero-based column index.
/// Absent columns stay `None` and are skipped by callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderColumns {
    pub title: Option<usize>,
    pub code: Option<usize>,
    pub stock: Option<usize>,
    pub min_stock: Option<usize>,
    pub unit_cost: Option<usize>,
}

impl HeaderColumns {
    fn slot_mut(&mut self, column: SheetColumn) -> &mut Option<usize> {
        match column {
            SheetColumn::Title => &mut self.title,
            SheetColumn::Code => &mut self.code,
            SheetColumn::Stock => &mut self.stock,
            SheetColumn::MinStock => &mut self.min_stock,
            SheetColumn::UnitCost => &mut self.unit_cost,
        }
    }

    pub fn get(&self, column: SheetColumn) -> Option<usize> {
        match column {
            SheetColumn::Title => self.title,
            SheetColumn::Code => self.code,
            SheetColumn::Stock => self.stock,
            SheetColumn::MinStock => self.min_stock,
            SheetColumn::UnitCost => self.unit_cost,
        }
    }

    /// Require a column, mapping its absence to the abort-the-operation error
    pub fn require(&self, column: SheetColumn) -> Result<usize, SheetsError> {
        self.get(column)
            .ok_or(SheetsError::ColumnNotFound(column.as_str()))
    }
}

/// A resolved header row: where it sits and what its columns mean
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHeaders {
    /// Zero-based index of the header row within the grid
    pub header_row: usize,
    /// Zero-based index of the first data row
    pub first_data_row: usize,
    pub columns: HeaderColumns,
}

/// Classify one header cell. Rules run in a fixed priority order and the
/// first match wins; a cell matching none is ignored.
fn classify_header(cell: &str) -> Option<SheetColumn> {
    let header = cell.trim().to_lowercase();
    if header.contains("titulo") || header.contains("título") {
        Some(SheetColumn::Title)
    } else if header.contains("codigo") || header.contains("código") {
        Some(SheetColumn::Code)
    } else if header == "stock" && !header.contains("min") {
        Some(SheetColumn::Stock)
    } else if header.contains("stock min") || header.contains("stockmin") {
        Some(SheetColumn::MinStock)
    } else if header.contains("precio costo") || header.contains("preciocosto") {
        Some(SheetColumn::UnitCost)
    } else {
        None
    }
}

/// A row is the header row if any cell mentions "codigo" or "stock"
fn is_header_row(row: &[String]) -> bool {
    row.iter().any(|cell| {
        let cell = cell.to_lowercase();
        cell.contains("codigo") || cell.contains("stock")
    })
}

/// Locate the header row and classify its columns.
///
/// The first qualifying row wins; the row after it is the first data row.
/// Duplicate semantic matches keep the first column seen and log a warning.
pub fn resolve_headers(rows: &[Vec<String>]) -> Result<ResolvedHeaders, SheetsError> {
    let header_row = rows
        .iter()
        .position(|row| is_header_row(row))
        .ok_or(SheetsError::HeadersNotFound)?;

    let mut columns = HeaderColumns::default();
    for (index, cell) in rows[header_row].iter().enumerate() {
        let Some(column) = classify_header(cell) else {
            continue;
        };
        let slot = columns.slot_mut(column);
        match slot {
            None => *slot = Some(index),
            Some(kept) => {
                tracing::warn!(
                    "Duplicate '{}' header in column {} ignored (keeping column {})",
                    column.as_str(),
                    column_letter(index),
                    column_letter(*kept),
                );
            }
        }
    }

    Ok(ResolvedHeaders {
        header_row,
        first_data_row: header_row + 1,
        columns,
    })
}

/// Zero-based column index → A1 letters ("A", "Z", "AA", ...)
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ASCII letters")
}

/// A1 reference for (1-based row, zero-based column)
pub fn a1_cell(row: usize, column: usize) -> String {
    format!("{}{}", column_letter(column), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_selects_first_qualifying_row() {
        let rows = grid(&[
            &["Planilla de control", ""],
            &["", ""],
            &["Título", "Codigo", "Stock"],
            &["A", "123", "5"],
        ]);
        let resolved = resolve_headers(&rows).unwrap();
        assert_eq!(resolved.header_row, 2);
        assert_eq!(resolved.first_data_row, 3);
        assert_eq!(resolved.columns.title, Some(0));
        assert_eq!(resolved.columns.code, Some(1));
        assert_eq!(resolved.columns.stock, Some(2));
    }

    #[test]
    fn test_no_header_row() {
        let rows = grid(&[&["a", "b"], &["c", "d"]]);
        assert!(matches!(
            resolve_headers(&rows),
            Err(SheetsError::HeadersNotFound)
        ));
    }

    #[test]
    fn test_accented_variants() {
        let rows = grid(&[&["TÍTULO", "Código", "Stock", "Stock Mín", "Precio Costo"]]);
        // Row qualifies via "Stock"; "Código" alone would not, the accented
        // form is only recognized during classification.
        let resolved = resolve_headers(&rows).unwrap();
        assert_eq!(resolved.columns.title, Some(0));
        assert_eq!(resolved.columns.code, Some(1));
        assert_eq!(resolved.columns.stock, Some(2));
        assert_eq!(resolved.columns.unit_cost, Some(4));
    }

    #[test]
    fn test_stock_must_be_exact() {
        // "Stock Min" and "StockMin" must not claim the stock column
        let rows = grid(&[&["Codigo", "Stock Min", "StockMin", "Stock"]]);
        let resolved = resolve_headers(&rows).unwrap();
        assert_eq!(resolved.columns.stock, Some(3));
        assert_eq!(resolved.columns.min_stock, Some(1));
    }

    #[test]
    fn test_duplicate_headers_first_wins() {
        let rows = grid(&[&["Codigo", "Codigo de producto", "Stock"]]);
        let resolved = resolve_headers(&rows).unwrap();
        assert_eq!(resolved.columns.code, Some(0));
    }

    #[test]
    fn test_unknown_headers_ignored() {
        let rows = grid(&[&["Sucursal", "Codigo", "Observaciones", "Stock"]]);
        let resolved = resolve_headers(&rows).unwrap();
        assert_eq!(resolved.columns.code, Some(1));
        assert_eq!(resolved.columns.stock, Some(3));
        assert_eq!(resolved.columns.title, None);
        assert_eq!(resolved.columns.unit_cost, None);
    }

    #[test]
    fn test_require_missing_column() {
        let rows = grid(&[&["Codigo"]]);
        let resolved = resolve_headers(&rows).unwrap();
        assert!(resolved.columns.require(SheetColumn::Code).is_ok());
        assert!(matches!(
            resolved.columns.require(SheetColumn::Stock),
            Err(SheetsError::ColumnNotFound("stock"))
        ));
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(5), "F");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(701), "ZZ");
    }

    #[test]
    fn test_a1_cell() {
        assert_eq!(a1_cell(2, 2), "C2");
        assert_eq!(a1_cell(10, 0), "A10");
    }
}
