use serde::{Deserialize, Serialize};

/// Outcome of one reconciliation pass against the sheet.
///
/// Reconciliation only touches stock cells of rows that already exist;
/// products missing from the sheet and sheet rows missing from memory are
/// counted, never created or deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSummary {
    /// Stock cells rewritten because the values differed
    pub updated: usize,
    /// Products whose sheet value already matched
    pub unchanged: usize,
    /// Products in memory with no row in the sheet
    pub not_found: usize,
    /// Sheet rows whose code is unknown to the store
    pub unknown_rows: usize,
    /// Codes whose cell write failed twice (primary + fallback)
    pub failed: Vec<String>,
}

impl std::fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} updated, {} unchanged, {} not found",
            self.updated, self.unchanged, self.not_found
        )?;
        if !self.failed.is_empty() {
            write!(f, ", {} writes failed", self.failed.len())?;
        }
        Ok(())
    }
}
