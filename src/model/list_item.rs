//! List item: one stable-keyed element of a windowed list.

use super::identifiers::ItemId;

/// An item in a windowed list.
///
/// `content` is opaque to the list renderer; only the host's rendering
/// collaborator looks inside it. `measured_height` is `None` until the host
/// reports a real measurement for the item.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem<T> {
    id: ItemId,
    content: T,
    measured_height: Option<f64>,
}

impl<T> ListItem<T> {
    /// Create an unmeasured item.
    pub fn new(id: ItemId, content: T) -> Self {
        Self {
            id,
            content,
            measured_height: None,
        }
    }

    /// Create an item whose height is already known.
    pub fn with_height(id: ItemId, content: T, height: f64) -> Self {
        Self {
            id,
            content,
            measured_height: Some(height),
        }
    }

    /// Stable id of the item.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Item content.
    pub fn content(&self) -> &T {
        &self.content
    }

    /// Mutable access to the content.
    pub fn content_mut(&mut self) -> &mut T {
        &mut self.content
    }

    /// Last measured height, if the item was ever measured.
    pub fn measured_height(&self) -> Option<f64> {
        self.measured_height
    }

    pub(crate) fn set_measured_height(&mut self, height: f64) {
        self.measured_height = Some(height);
    }

    /// Consume the item, returning its content.
    pub fn into_content(self) -> T {
        self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ItemId {
        ItemId::new(s).expect("valid test id")
    }

    #[test]
    fn new_item_is_unmeasured() {
        let item = ListItem::new(id("a"), "hello");
        assert_eq!(item.measured_height(), None);
        assert_eq!(*item.content(), "hello");
    }

    #[test]
    fn with_height_records_measurement() {
        let item = ListItem::with_height(id("a"), (), 12.5);
        assert_eq!(item.measured_height(), Some(12.5));
    }

    #[test]
    fn content_mut_allows_streaming_growth() {
        let mut item = ListItem::new(id("a"), String::from("Hel"));
        item.content_mut().push_str("lo");
        assert_eq!(item.into_content(), "Hello");
    }
}
