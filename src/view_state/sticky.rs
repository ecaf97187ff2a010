//! Sticky-bottom auto-scroll.
//!
//! When the viewer is at the end of the content, new content keeps them
//! there. Scrolling away disengages it; scrolling back to the end
//! re-engages it. Stickiness is always recomputed from the viewport, never
//! stored.

use super::types::Viewport;

/// Default distance from the end still treated as "at the bottom".
pub const DEFAULT_STICKY_EPSILON: f64 = 1.0;

/// What just happened to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// A new item was added at the end.
    Appended,
    /// The content of the last item changed (streaming text).
    LastItemMutated,
    /// An item's measured height changed.
    Resized,
    /// Items were removed from the end.
    Truncated,
    /// The list was emptied.
    Reset,
}

impl ListChange {
    /// Changes that keep a sticky viewer pinned to the end.
    pub fn follows_end(self) -> bool {
        matches!(
            self,
            ListChange::Appended | ListChange::LastItemMutated | ListChange::Resized
        )
    }
}

/// Scroll request the host must honor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollTo {
    /// Scroll so the end of the content is visible.
    End {
        /// Target scroll offset.
        offset: f64,
    },
}

impl ScrollTo {
    /// Target scroll offset.
    pub fn offset(&self) -> f64 {
        match self {
            ScrollTo::End { offset } => *offset,
        }
    }
}

/// Decides when to auto-scroll to the end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickyBottom {
    /// Slack, in height units, between the viewport bottom and the content end.
    pub epsilon: f64,
}

impl Default for StickyBottom {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_STICKY_EPSILON,
        }
    }
}

impl StickyBottom {
    /// Create with the given slack.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// True when the viewport bottom is within `epsilon` of the content end,
    /// or the content fits in the viewport.
    ///
    /// ```
    /// # use tokflow::view_state::sticky::StickyBottom;
    /// # use tokflow::view_state::types::Viewport;
    /// let sticky = StickyBottom::new(1.0);
    /// assert!(sticky.should_stick_to_bottom(Viewport::new(76.0, 24.0), 100.0));
    /// assert!(!sticky.should_stick_to_bottom(Viewport::new(50.0, 24.0), 100.0));
    /// ```
    pub fn should_stick_to_bottom(&self, viewport: Viewport, total_extent: f64) -> bool {
        if !viewport.is_valid() {
            return false;
        }
        total_extent <= viewport.extent || total_extent - viewport.bottom() <= self.epsilon
    }

    /// Scroll offset that puts the end of the content at the viewport bottom.
    pub fn end_offset(&self, viewport: Viewport, total_extent: f64) -> f64 {
        (total_extent - viewport.extent).max(0.0)
    }

    /// Scroll request after `change`, given stickiness measured before it.
    pub fn after_update(
        &self,
        was_sticky: bool,
        change: ListChange,
        viewport: Viewport,
        new_total: f64,
    ) -> Option<ScrollTo> {
        (was_sticky && change.follows_end()).then(|| ScrollTo::End {
            offset: self.end_offset(viewport, new_total),
        })
    }
}
