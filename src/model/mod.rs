//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod identifiers;
pub mod list_item;

// Re-export for convenience
pub use error::{AppError, InputError, RevealError};
pub use identifiers::{InvalidItemId, ItemId};
pub use list_item::ListItem;
