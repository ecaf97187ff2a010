//! View-state layer - virtualized list, height index, sticky-bottom, render cache
//!
//! Decides which items of an unbounded, growing list are materialized, how
//! much extent the spacers around them stand for, and when the viewport
//! follows the end of the content.
//!
//! # Module Structure
//!
//! - `types`: `Viewport` (scroll offset and extent, host-driven)
//! - `height_index`: HeightIndex - O(log n) prefix sums via Fenwick tree
//! - `window`: `compute_window` and `ListWindow`
//! - `list`: `WindowedList` - items, height cache, current viewport
//! - `sticky`: `StickyBottom` auto-scroll controller
//! - `cache`: `RenderCache` - LRU memoization of render results

pub mod cache;
pub mod height_index;
pub mod list;
pub mod sticky;
pub mod types;
pub mod window;

pub use cache::{CacheStats, RenderCache, RenderCacheConfig};
pub use height_index::HeightIndex;
pub use list::{HeightCache, ListConfig, UpdateOutcome, WindowedList};
pub use sticky::{ListChange, ScrollTo, StickyBottom};
pub use types::Viewport;
pub use window::{compute_window, ListWindow};
