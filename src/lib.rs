//! tokflow - frame-paced token reveal and virtualized transcript rendering
//!
//! Streaming chat output arrives in bursty chunks. This crate smooths it
//! into a steady, grapheme-safe reveal and keeps long transcripts cheap to
//! draw:
//!
//! - [`reveal`]: grapheme segmentation, frame ticks, proportional batching
//!   and the per-message reveal scheduler
//! - [`view_state`]: height index, window computation, sticky-bottom
//!   scrolling, the windowed list and the LRU render cache
//! - [`source`] and [`view`]: a replay source and a ratatui transcript host
//!
//! The core is single-threaded and synchronous; the host drives it by
//! delivering frame ticks.

pub mod config;
pub mod logging;
pub mod model;
pub mod reveal;
pub mod source;
pub mod view;
pub mod view_state;
