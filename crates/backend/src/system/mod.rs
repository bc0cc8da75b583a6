pub mod edit_guard;

pub use edit_guard::{EditGuard, EditGuardError};
