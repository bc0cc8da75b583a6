use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditGuardError {
    #[error("An edit is already in progress for product {0}; finish it before starting another")]
    Busy(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EditState {
    Idle,
    Busy { code: String, prior_stock: u32 },
}

/// Serializes logical stock-change operations.
///
/// One operation may be in flight at a time; a second request is rejected
/// with the code of the product being edited, never queued. The prior stock
/// level is held so an aborted operation can be rolled back.
#[derive(Debug)]
pub struct EditGuard {
    state: EditState,
}

impl EditGuard {
    pub fn new() -> Self {
        Self {
            state: EditState::Idle,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, EditState::Busy { .. })
    }

    /// Enter the busy state for one product
    pub fn begin(&mut self, code: &str, prior_stock: u32) -> Result<(), EditGuardError> {
        match &self.state {
            EditState::Idle => {
                self.state = EditState::Busy {
                    code: code.to_string(),
                    prior_stock,
                };
                Ok(())
            }
            EditState::Busy { code: busy, .. } => Err(EditGuardError::Busy(busy.clone())),
        }
    }

    /// Operation committed; back to idle
    pub fn finish(&mut self) {
        self.state = EditState::Idle;
    }

    /// Operation failed; back to idle, returning the stock level to restore
    pub fn abort(&mut self) -> Option<(String, u32)> {
        match std::mem::replace(&mut self.state, EditState::Idle) {
            EditState::Busy { code, prior_stock } => Some((code, prior_stock)),
            EditState::Idle => None,
        }
    }
}

impl Default for EditGuard {
    fn default() -> Self {
        Self::new()
    }
}
