use contracts::domain::a001_product::{Product, ProductDto};
use contracts::domain::common::AggregateId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown product code: {0}")]
    UnknownCode(String),

    #[error("Product {0} already exists")]
    DuplicateCode(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error("Invalid product: {0}")]
    InvalidProduct(String),
}

/// In-memory product map, keyed by product code.
///
/// Source of truth for the session; every mutation is flushed to the local
/// file and, when a sheet is connected, reconciled against it. A `BTreeMap`
/// keeps listing order stable across flushes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductStore {
    products: BTreeMap<String, Product>,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn clear(&mut self) {
        self.products.clear();
    }

    pub fn get(&self, code: &str) -> Option<&Product> {
        self.products.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.products.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Insert or replace a record wholesale (used by import paths)
    pub fn upsert(&mut self, product: Product) -> Result<(), StoreError> {
        product.validate().map_err(StoreError::InvalidProduct)?;
        self.products.insert(product.code.as_string(), product);
        Ok(())
    }

    /// Create a new product from user input; duplicate codes are rejected
    /// rather than silently replaced.
    pub fn create(&mut self, dto: ProductDto) -> Result<(), StoreError> {
        let product = dto.into_product().map_err(StoreError::InvalidProduct)?;
        let code = product.code.as_string();
        if self.products.contains_key(&code) {
            return Err(StoreError::DuplicateCode(code));
        }
        self.products.insert(code, product);
        Ok(())
    }

    /// Add units to a product's stock; returns the new level
    pub fn add_units(&mut self, code: &str, quantity: u32) -> Result<u32, StoreError> {
        let product = self
            .products
            .get_mut(code)
            .ok_or_else(|| StoreError::UnknownCode(code.to_string()))?;
        Ok(product.add_units(quantity))
    }

    /// Remove units from a product's stock, bounded by the current level
    pub fn remove_units(&mut self, code: &str, quantity: u32) -> Result<u32, StoreError> {
        let product = self
            .products
            .get_mut(code)
            .ok_or_else(|| StoreError::UnknownCode(code.to_string()))?;
        product.remove_units(quantity).map_err(StoreError::InsufficientStock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_product::ProductCode;

    fn product(code: &str, stock: u32) -> Product {
        let mut p = Product::new_for_insert(
            ProductCode::new(code),
            format!("Producto {code}"),
            2,
            "$100".into(),
        );
        p.stock = stock;
        p
    }

    #[test]
    fn test_decrement_below_zero_is_rejected() {
        let mut store = ProductStore::new();
        store.upsert(product("123", 2)).unwrap();

        let err = store.remove_units("123", 3).unwrap_err();
        assert!(matches!(err, StoreError::InsufficientStock(_)));
        assert_eq!(store.get("123").unwrap().stock, 2, "prior value preserved");

        assert_eq!(store.remove_units("123", 2).unwrap(), 0);
    }

    #[test]
    fn test_create_rejects_duplicate_code() {
        let mut store = ProductStore::new();
        store.upsert(product("123", 0)).unwrap();

        let err = store
            .create(ProductDto {
                code: "123".into(),
                display_name: "Otro".into(),
                minimum_stock: 1,
                unit_cost: "$5".into(),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCode(_)));
    }

    #[test]
    fn test_unknown_code() {
        let mut store = ProductStore::new();
        assert!(matches!(
            store.add_units("999", 1),
            Err(StoreError::UnknownCode(_))
        ));
    }

    #[test]
    fn test_iteration_is_ordered_by_code() {
        let mut store = ProductStore::new();
        store.upsert(product("30", 0)).unwrap();
        store.upsert(product("10", 0)).unwrap();
        store.upsert(product("20", 0)).unwrap();
        let codes: Vec<_> = store.iter().map(|p| p.code.as_str().to_string()).collect();
        assert_eq!(codes, ["10", "20", "30"]);
    }
}
