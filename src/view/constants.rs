//! Layout and timing constants for the transcript view.

use std::time::Duration;

/// Height of the status bar in lines.
///
/// Single line at the bottom of the screen for stream state and position.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Host frame interval.
///
/// The event loop wakes at least this often to deliver reveal ticks and
/// poll the replay source. Roughly 60 frames per second.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Width used when the terminal reports zero columns.
pub const FALLBACK_WIDTH: u16 = 80;
