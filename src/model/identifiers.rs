//! Core identifier newtypes with smart constructors.
//!
//! Identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use std::fmt;

/// Stable identifier for an item in a windowed list.
///
/// Unique within one list. Used as the key of the height cache, so it
/// must stay the same for the whole lifetime of the item (including while
/// its content is still streaming in).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Smart constructor: validates non-empty id.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidItemId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidItemId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ===== Error Types =====

/// Error returned by [`ItemId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidItemId {
    /// The id string was empty.
    #[error("Item ID cannot be empty")]
    Empty,
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_rejects_empty() {
        assert_eq!(ItemId::new(""), Err(InvalidItemId::Empty));
    }

    #[test]
    fn item_id_accepts_non_empty() {
        let id = ItemId::new("msg-1").expect("valid id");
        assert_eq!(id.as_str(), "msg-1");
    }

    #[test]
    fn item_id_display_matches_raw() {
        let id = ItemId::new("assistant-42").unwrap();
        assert_eq!(id.to_string(), "assistant-42");
    }

    #[test]
    fn item_ids_compare_by_value() {
        let a = ItemId::new("a").unwrap();
        let a2 = ItemId::new(String::from("a")).unwrap();
        let b = ItemId::new("b").unwrap();
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert!(a < b);
    }
}
