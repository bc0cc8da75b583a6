pub mod aggregate;

pub use aggregate::{CachedSheet, ConnectionStatus, ConnectionTestResult, ServiceAccountKey};
