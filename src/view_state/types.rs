//! Core view-state types

/// Scroll/viewport state, driven by the host.
///
/// Both fields are in the same abstract height units as item heights
/// (terminal rows, pixels, ...). Read-only to the core.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Distance from the top of the content to the top of the viewport.
    pub scroll_offset: f64,
    /// Visible height of the viewport.
    pub extent: f64,
}

impl Viewport {
    /// Create a viewport.
    pub fn new(scroll_offset: f64, extent: f64) -> Self {
        Self {
            scroll_offset,
            extent,
        }
    }

    /// Content offset at the bottom edge of the viewport.
    pub fn bottom(&self) -> f64 {
        self.scroll_offset + self.extent
    }

    /// False for inverted or non-finite viewports (negative offset or
    /// extent, NaN, infinity). Such viewports yield an empty window.
    pub fn is_valid(&self) -> bool {
        self.scroll_offset.is_finite()
            && self.extent.is_finite()
            && self.scroll_offset >= 0.0
            && self.extent >= 0.0
    }

    /// Same extent, different offset.
    pub fn with_offset(&self, scroll_offset: f64) -> Self {
        Self {
            scroll_offset,
            extent: self.extent,
        }
    }
}
