//! WindowedList - virtualized list with a height cache and sticky-bottom.
//!
//! Owns every item but only ever hands out a bounded window of them to
//! render. Items that have never been measured count with the configured
//! estimate; measured heights replace the estimate and persist in the
//! height cache even after the item leaves the window.

use super::height_index::HeightIndex;
use super::sticky::{ListChange, ScrollTo, StickyBottom, DEFAULT_STICKY_EPSILON};
use super::types::Viewport;
use super::window::{compute_window, ListWindow};
use crate::model::{ItemId, ListItem};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Default estimate for items that were never measured.
pub const DEFAULT_ESTIMATED_HEIGHT: f64 = 3.0;
/// Default number of extra items materialized on each side of the viewport.
pub const DEFAULT_BUFFER_COUNT: usize = 5;
/// Default tolerance when comparing a new measurement with the cached one.
pub const DEFAULT_MEASURE_EPSILON: f64 = 0.5;

/// Tunables for a [`WindowedList`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListConfig {
    /// Height assumed for unmeasured items.
    pub estimated_height: f64,
    /// Extra items on each side of the visible range.
    pub buffer_count: usize,
    /// Measurements within this distance of the cached height are ignored.
    pub measure_epsilon: f64,
    /// Slack for the sticky-bottom check.
    pub sticky_epsilon: f64,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            estimated_height: DEFAULT_ESTIMATED_HEIGHT,
            buffer_count: DEFAULT_BUFFER_COUNT,
            measure_epsilon: DEFAULT_MEASURE_EPSILON,
            sticky_epsilon: DEFAULT_STICKY_EPSILON,
        }
    }
}

/// Measured heights keyed by item id.
#[derive(Debug, Clone, Default)]
pub struct HeightCache {
    heights: HashMap<ItemId, f64>,
}

impl HeightCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached height of `id`.
    pub fn get(&self, id: &ItemId) -> Option<f64> {
        self.heights.get(id).copied()
    }

    /// Record a measurement, returning the previous one.
    pub fn insert(&mut self, id: ItemId, height: f64) -> Option<f64> {
        self.heights.insert(id, height)
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.heights.clear();
    }

    /// Number of measured items.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// True when nothing was measured.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

/// Result of a list mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateOutcome {
    /// False when the mutation was refused (duplicate id, empty list).
    pub applied: bool,
    /// Scroll request the host must honor, already applied to the list's
    /// own viewport.
    pub scroll_to: Option<ScrollTo>,
    /// Window after the mutation.
    pub window: ListWindow,
}

/// Virtualized list of items with stable ids.
#[derive(Debug, Clone)]
pub struct WindowedList<T> {
    items: Vec<ListItem<T>>,
    positions: HashMap<ItemId, usize>,
    height_cache: HeightCache,
    heights: HeightIndex,
    viewport: Viewport,
    sticky: StickyBottom,
    config: ListConfig,
}

impl<T> WindowedList<T> {
    /// Empty list with the given tunables.
    pub fn new(config: ListConfig) -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
            height_cache: HeightCache::new(),
            heights: HeightIndex::new(64),
            viewport: Viewport::default(),
            sticky: StickyBottom::new(config.sticky_epsilon),
            config,
        }
    }

    // === Mutations ===

    /// Append an item.
    ///
    /// A duplicate id is refused and leaves the list untouched.
    pub fn push(&mut self, item: ListItem<T>) -> UpdateOutcome {
        if self.positions.contains_key(item.id()) {
            warn!(id = %item.id(), "Refusing to append item with duplicate id");
            return self.unchanged();
        }

        let was_sticky = self.is_sticky();

        let height = match item.measured_height() {
            Some(measured) if is_valid_height(measured) => {
                self.height_cache.insert(item.id().clone(), measured);
                measured
            }
            _ => self
                .height_cache
                .get(item.id())
                .unwrap_or(self.config.estimated_height),
        };

        self.positions.insert(item.id().clone(), self.items.len());
        self.heights.push(height);
        self.items.push(item);
        trace!(len = self.items.len(), height, "Appended item");

        self.finish_update(was_sticky, ListChange::Appended)
    }

    /// Mutate the content of the last item in place.
    ///
    /// Its height is unchanged until the host reports a new measurement.
    pub fn update_last(&mut self, mutate: impl FnOnce(&mut T)) -> UpdateOutcome {
        if self.items.is_empty() {
            debug!("update_last on empty list");
            return self.unchanged();
        }
        let was_sticky = self.is_sticky();
        if let Some(last) = self.items.last_mut() {
            mutate(last.content_mut());
        }
        self.finish_update(was_sticky, ListChange::LastItemMutated)
    }

    /// Keep only the first `len` items.
    ///
    /// Cached heights of removed items are kept; an item pushed again with
    /// the same id starts from its last measured height.
    pub fn truncate(&mut self, len: usize) -> UpdateOutcome {
        if len >= self.items.len() {
            return self.unchanged();
        }

        for item in self.items.drain(len..) {
            self.positions.remove(item.id());
        }
        self.heights.truncate(len);
        debug!(len, "Truncated list");

        self.finish_update(false, ListChange::Truncated)
    }

    /// Remove every item, clear the height cache and scroll to the top.
    pub fn reset(&mut self) -> UpdateOutcome {
        self.items.clear();
        self.positions.clear();
        self.height_cache.clear();
        self.heights.clear();
        self.viewport = self.viewport.with_offset(0.0);
        debug!("Reset list");

        self.finish_update(false, ListChange::Reset)
    }

    /// Record a measured height for `id`.
    ///
    /// Returns the recomputed window when the height moved by more than
    /// `measure_epsilon` from the cached value, `None` otherwise. Unknown
    /// ids and negative or non-finite heights are ignored. When the viewer
    /// was at the bottom, the list's viewport follows the new end; read it
    /// back with [`viewport`](Self::viewport).
    pub fn on_height_measured(&mut self, id: &ItemId, height: f64) -> Option<ListWindow> {
        if !is_valid_height(height) {
            debug!(%id, height, "Ignoring invalid height measurement");
            return None;
        }
        let Some(&position) = self.positions.get(id) else {
            debug!(%id, "Ignoring measurement for unknown item");
            return None;
        };

        let cached = self.height_cache.get(id);
        let previous = cached.unwrap_or_else(|| self.heights.get(position));
        let changed = (height - previous).abs() > self.config.measure_epsilon;

        if cached.is_some() && !changed {
            return None;
        }

        let was_sticky = self.is_sticky();

        self.height_cache.insert(id.clone(), height);
        self.items[position].set_measured_height(height);
        self.heights.set(position, height);

        if !changed {
            // Sub-epsilon drift still moves the end; stay pinned to it
            if was_sticky {
                self.finish_update(was_sticky, ListChange::Resized);
            }
            return None;
        }

        trace!(%id, previous, height, "Item height changed");
        Some(self.finish_update(was_sticky, ListChange::Resized).window)
    }

    /// Host scroll or resize notification. Returns the new window.
    pub fn set_viewport(&mut self, viewport: Viewport) -> ListWindow {
        if !viewport.is_valid() {
            debug!(?viewport, "Invalid viewport set");
        }
        self.viewport = viewport;
        self.window()
    }

    /// Scroll the list's own viewport to the end of the content.
    pub fn scroll_to_end(&mut self) -> ScrollTo {
        let offset = self.sticky.end_offset(self.viewport, self.total_extent());
        self.viewport = self.viewport.with_offset(offset);
        ScrollTo::End { offset }
    }

    // === Queries ===

    /// Window for the current viewport.
    pub fn window(&self) -> ListWindow {
        self.get_window(self.viewport)
    }

    /// Window for an arbitrary viewport. Does not change any state.
    pub fn get_window(&self, viewport: Viewport) -> ListWindow {
        compute_window(&self.heights, viewport, self.config.buffer_count)
    }

    /// Sum of best-known heights of all items.
    pub fn total_extent(&self) -> f64 {
        self.heights.total()
    }

    /// True when the current viewport sits at the end of the content.
    pub fn is_sticky(&self) -> bool {
        self.sticky.should_stick_to_bottom(self.viewport, self.total_extent())
    }

    /// All items, in order.
    pub fn items(&self) -> &[ListItem<T>] {
        &self.items
    }

    /// Items inside the current window.
    pub fn visible_items(&self) -> &[ListItem<T>] {
        &self.items[self.window().range()]
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the list has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Best-known height of `id`: measured if available, else the estimate.
    pub fn height_of(&self, id: &ItemId) -> Option<f64> {
        self.positions
            .get(id)
            .map(|&position| self.heights.get(position))
    }

    /// Position of `id` in the list.
    pub fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Measured heights.
    pub fn height_cache(&self) -> &HeightCache {
        &self.height_cache
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Tunables this list was built with.
    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    fn finish_update(&mut self, was_sticky: bool, change: ListChange) -> UpdateOutcome {
        let scroll_to = self
            .sticky
            .after_update(was_sticky, change, self.viewport, self.total_extent());
        if let Some(request) = scroll_to {
            self.viewport = self.viewport.with_offset(request.offset());
        }
        UpdateOutcome {
            applied: true,
            scroll_to,
            window: self.window(),
        }
    }

    fn unchanged(&self) -> UpdateOutcome {
        UpdateOutcome {
            applied: false,
            scroll_to: None,
            window: self.window(),
        }
    }
}

impl<T> Default for WindowedList<T> {
    fn default() -> Self {
        Self::new(ListConfig::default())
    }
}

fn is_valid_height(height: f64) -> bool {
    height.is_finite() && height >= 0.0
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
