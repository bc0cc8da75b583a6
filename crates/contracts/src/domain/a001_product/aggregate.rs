use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateId, EntityMetadata};

// ============================================================================
// ID Type
// ============================================================================

/// Product identifier: the scanned barcode / article code.
///
/// This is a natural key, unique within a store, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductCode(pub String);

impl ProductCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AggregateId for ProductCode {
    fn as_string(&self) -> String {
        self.0.clone()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        let code = Self::new(s);
        if code.is_empty() {
            return Err("Product code must not be empty".into());
        }
        Ok(code)
    }
}

impl std::fmt::Display for ProductCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scanner heuristic: barcodes are 8-13 characters, all digits.
/// Anything else is treated as manually typed input.
pub fn looks_like_barcode(s: &str) -> bool {
    let s = s.trim();
    (8..=13).contains(&s.len()) && s.chars().all(|c| c.is_ascii_digit())
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// A stock-keeping unit tracked by the store.
///
/// On-disk field names follow the spreadsheet's Spanish headers so the local
/// data file stays readable next to the sheet it mirrors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "codigo")]
    pub code: ProductCode,

    #[serde(rename = "titulo")]
    pub display_name: String,

    #[serde(rename = "stock")]
    pub stock: u32,

    #[serde(rename = "stock_min")]
    pub minimum_stock: u32,

    /// Unit cost as found in the sheet ("$1.234,50", "12.50", ...).
    /// Kept verbatim; parsed only when a report needs a numeric value.
    #[serde(rename = "precio_costo")]
    pub unit_cost: String,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl Product {
    /// Create a new product with zero stock
    pub fn new_for_insert(
        code: ProductCode,
        display_name: String,
        minimum_stock: u32,
        unit_cost: String,
    ) -> Self {
        Self {
            code,
            display_name,
            stock: 0,
            minimum_stock,
            unit_cost,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.code.is_empty() {
            return Err("Product code must not be empty".into());
        }
        Ok(())
    }

    /// Refresh the update timestamp
    pub fn touch(&mut self) {
        self.metadata.touch();
    }

    /// Add units to stock; returns the new level
    pub fn add_units(&mut self, quantity: u32) -> u32 {
        self.stock += quantity;
        self.touch();
        self.stock
    }

    /// Remove units from stock, bounded by the current level.
    /// A removal that would go below zero is rejected and leaves the
    /// prior value untouched.
    pub fn remove_units(&mut self, quantity: u32) -> Result<u32, String> {
        if quantity > self.stock {
            return Err(format!(
                "Cannot remove {} units of {}: only {} in stock",
                quantity, self.code, self.stock
            ));
        }
        self.stock -= quantity;
        self.touch();
        Ok(self.stock)
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.minimum_stock
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO for creating a product from user input
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProductDto {
    pub code: String,
    pub display_name: String,
    pub minimum_stock: u32,
    pub unit_cost: String,
}

impl ProductDto {
    pub fn into_product(self) -> Result<Product, String> {
        let product = Product::new_for_insert(
            ProductCode::new(self.code),
            self.display_name.trim().to_string(),
            self.minimum_stock,
            self.unit_cost.trim().to_string(),
        );
        product.validate()?;
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_units_bounded() {
        let mut p = Product::new_for_insert(
            ProductCode::new("7791234567890"),
            "Yerba 1kg".into(),
            5,
            "$1.500".into(),
        );
        p.add_units(3);
        assert!(p.remove_units(4).is_err());
        assert_eq!(p.stock, 3, "rejected removal must not change stock");
        assert_eq!(p.remove_units(3).unwrap(), 0);
    }

    #[test]
    fn test_looks_like_barcode() {
        assert!(looks_like_barcode("12345678"));
        assert!(looks_like_barcode("7791234567890"));
        assert!(!looks_like_barcode("1234567"));
        assert!(!looks_like_barcode("77912345678901"));
        assert!(!looks_like_barcode("ABC12345"));
        assert!(!looks_like_barcode(""));
    }

    #[test]
    fn test_dto_rejects_empty_code() {
        let dto = ProductDto {
            code: "   ".into(),
            display_name: "x".into(),
            ..Default::default()
        };
        assert!(dto.into_product().is_err());
    }
}
