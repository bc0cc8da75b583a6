pub mod aggregate;

pub use aggregate::{looks_like_barcode, Product, ProductCode, ProductDto};
