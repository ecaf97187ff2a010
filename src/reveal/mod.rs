//! Reveal layer - frame-paced streaming of text chunks
//!
//! Turns bursty chunks from an upstream producer into a smooth,
//! grapheme-by-grapheme reveal driven by host frames.
//!
//! # Module Structure
//!
//! - `segment`: grapheme / code point segmentation of chunks
//! - `frame`: `FrameScheduler` trait (request/cancel tick) and `FrameQueue`
//! - `batch`: `BatchPolicy` trait and the proportional default
//! - `scheduler`: `RevealScheduler` state machine and `RevealSink`

pub mod batch;
pub mod frame;
pub mod scheduler;
pub mod segment;

pub use batch::{BatchPolicy, ProportionalBatch};
pub use frame::{FrameQueue, FrameScheduler, TickHandle};
pub use scheduler::{
    RevealBuffer, RevealConfig, RevealPhase, RevealScheduler, RevealSink, TickOutcome,
};
pub use segment::{segment, segment_codepoints, Segmenter};
