use serde::{Deserialize, Serialize};

/// Outcome of rebuilding the product store from the sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Data rows turned into product records
    pub imported: usize,
    /// Data rows skipped for an empty code cell
    pub skipped: usize,
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} products imported, {} rows skipped",
            self.imported, self.skipped
        )
    }
}
