pub mod executor;

pub use executor::export_to_sheet;
