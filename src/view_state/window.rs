//! Window computation for the virtualized list.
//!
//! Pure function of the height index and the viewport: which contiguous
//! range of items to materialize, and how much extent the spacers before
//! and after that range stand in for.

use super::height_index::HeightIndex;
use super::types::Viewport;
use std::ops::Range;
use tracing::debug;

/// Contiguous index range of materialized items plus spacer extents.
///
/// `[start_index, end_index)` is half-open. `leading_spacer` is the sum of
/// heights before `start_index`, `trailing_spacer` the sum from `end_index`
/// to the end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ListWindow {
    /// First materialized item.
    pub start_index: usize,
    /// One past the last materialized item.
    pub end_index: usize,
    /// Extent standing in for items before the window.
    pub leading_spacer: f64,
    /// Extent standing in for items after the window.
    pub trailing_spacer: f64,
}

impl ListWindow {
    /// Window with nothing materialized and `trailing_spacer` covering
    /// the whole list.
    pub fn empty(total: f64) -> Self {
        Self {
            start_index: 0,
            end_index: 0,
            leading_spacer: 0.0,
            trailing_spacer: total,
        }
    }

    /// Materialized indices.
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    /// Number of materialized items.
    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    /// True when nothing is materialized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `index` falls inside the window.
    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }
}

/// Compute the window of items to materialize for `viewport`.
///
/// The first visible item is the first whose bottom edge exceeds the scroll
/// offset; scrolling past the end clamps to the last item. The last visible
/// item is the first whose bottom edge reaches the viewport bottom, or the
/// last item. A zero extent keeps only the first visible item. The visible
/// range is then widened by `buffer` items on each side and clamped.
///
/// An inverted or non-finite viewport yields an empty window.
///
/// # Examples
///
/// ```
/// # use tokflow::view_state::height_index::HeightIndex;
/// # use tokflow::view_state::types::Viewport;
/// # use tokflow::view_state::window::compute_window;
/// let heights = HeightIndex::from_heights(&[10.0; 1000]);
/// let window = compute_window(&heights, Viewport::new(1000.0, 110.0), 5);
/// assert_eq!(window.start_index, 95);
/// assert_eq!(window.end_index, 116);
/// assert_eq!(window.leading_spacer, 950.0);
/// assert_eq!(window.trailing_spacer, 8840.0);
/// ```
pub fn compute_window(heights: &HeightIndex, viewport: Viewport, buffer: usize) -> ListWindow {
    let total = heights.total();

    if heights.is_empty() {
        return ListWindow::empty(0.0);
    }

    if !viewport.is_valid() {
        debug!(?viewport, "Ignoring invalid viewport");
        return ListWindow::empty(total);
    }

    let last_index = heights.len() - 1;

    let first_visible = heights
        .lower_bound(viewport.scroll_offset)
        .unwrap_or(last_index);

    let last_visible = if viewport.extent == 0.0 {
        first_visible
    } else {
        heights
            .first_reaching(viewport.bottom())
            .unwrap_or(last_index)
            .max(first_visible)
    };

    let start_index = first_visible.saturating_sub(buffer);
    let end_index = last_visible.saturating_add(buffer).min(last_index) + 1;

    let leading_spacer = heights.offset_of(start_index);
    let trailing_spacer = (total - heights.offset_of(end_index)).max(0.0);

    ListWindow {
        start_index,
        end_index,
        leading_spacer,
        trailing_spacer,
    }
}
