//! Reveal scheduler: frame-paced, cancellable draining of a chunk stream.
//!
//! One scheduler per streaming message. Chunks are segmented into grapheme
//! units and queued; every frame the host delivers a tick and the scheduler
//! reveals a slice of the queue, publishing the cumulative text to its sink.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──enqueue──▶ Streaming ──mark_stream_ended──▶ Draining ──tick──▶ Finished
//!   ▲                                                                     │
//!   └──────────────────────────── reset (from any state) ◀────────────────┘
//! dispose (from any state) ──▶ Disposed (terminal)
//! ```
//!
//! # Tick rules
//!
//! 1. Queue empty, stream open: nothing to do, keep scheduling.
//! 2. Queue empty, stream ended: publish the final text, stop scheduling.
//! 3. Less than `min_delay` since the last publish: throttle, keep scheduling.
//! 4. Otherwise drain a batch (the whole queue once the stream has ended),
//!    append it and publish; keep scheduling while work remains.
//!
//! Throttling only delays batches. Units are never dropped or reordered.

use super::batch::{BatchPolicy, ProportionalBatch, DEFAULT_BATCH_DIVISOR};
use super::frame::{FrameScheduler, TickHandle};
use super::segment::Segmenter;
use crate::model::RevealError;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Default minimum delay between two publishes (one 60 Hz frame).
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(16);

/// Receives revealed text (`onReveal`).
///
/// Implemented for every `FnMut(&str)`.
pub trait RevealSink {
    /// Called with the full cumulative text each time it grows, and with the
    /// baseline on [`RevealScheduler::reset`].
    fn on_reveal(&mut self, cumulative: &str);

    /// Called once with the final text when the stream has been fully
    /// revealed. Defaults to [`RevealSink::on_reveal`].
    fn on_finish(&mut self, final_text: &str) {
        self.on_reveal(final_text);
    }
}

impl<F> RevealSink for F
where
    F: FnMut(&str),
{
    fn on_reveal(&mut self, cumulative: &str) {
        self(cumulative);
    }
}

/// Shared text buffer sink for hosts that poll instead of pushing.
///
/// Clones share state: hand one clone to the scheduler and keep another to
/// read from on each frame.
#[derive(Debug, Clone, Default)]
pub struct RevealBuffer {
    text: Rc<RefCell<String>>,
    version: Rc<Cell<u64>>,
    finished: Rc<Cell<bool>>,
}

impl RevealBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cumulative text.
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Number of publishes received so far.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// True once the final text has been published.
    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }
}

impl RevealSink for RevealBuffer {
    fn on_reveal(&mut self, cumulative: &str) {
        let mut text = self.text.borrow_mut();
        text.clear();
        text.push_str(cumulative);
        self.version.set(self.version.get() + 1);
        self.finished.set(false);
    }

    fn on_finish(&mut self, final_text: &str) {
        self.on_reveal(final_text);
        self.finished.set(true);
    }
}

/// Tunable pacing parameters for a reveal scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealConfig {
    /// Minimum time between two publishes. Soft pacing, never an error.
    pub min_delay: Duration,
    /// Divisor of the proportional batch policy.
    pub batch_divisor: usize,
    /// How chunks are split into reveal units.
    pub segmentation: Segmenter,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            min_delay: DEFAULT_MIN_DELAY,
            batch_divisor: DEFAULT_BATCH_DIVISOR,
            segmentation: Segmenter::Graphemes,
        }
    }
}

/// Lifecycle phase of a [`RevealScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// Nothing enqueued since creation or the last reset.
    Idle,
    /// Receiving chunks.
    Streaming,
    /// Stream ended; revealing what is left.
    Draining,
    /// Everything revealed and the final text published.
    Finished,
    /// Torn down. Every operation is a no-op.
    Disposed,
}

/// What a call to [`RevealScheduler::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The handle was not the pending one (cancelled, late, or disposed).
    Stale,
    /// Queue empty and stream still open.
    Waiting,
    /// Too soon after the previous publish.
    Throttled,
    /// A batch was revealed and published.
    Revealed {
        /// Units drained in this batch.
        units: usize,
    },
    /// Final text published; no further ticks.
    Finished,
    /// Batch computation failed; logged and rescheduled.
    Recovered,
}

/// Frame-paced reveal of a chunk stream.
///
/// Generic over the sink receiving text and the host's frame scheduler.
/// At most one tick is pending at any time.
pub struct RevealScheduler<S: RevealSink, F: FrameScheduler> {
    sink: S,
    frames: F,
    policy: Box<dyn BatchPolicy>,
    segmenter: Segmenter,
    min_delay: Duration,
    queue: VecDeque<String>,
    revealed: String,
    last_publish: Option<Instant>,
    stream_ended: bool,
    phase: RevealPhase,
    pending: Option<TickHandle>,
}

impl<S: RevealSink, F: FrameScheduler> RevealScheduler<S, F> {
    /// Create a scheduler with the proportional batch policy from `config`.
    pub fn new(sink: S, frames: F, config: RevealConfig) -> Self {
        Self::with_policy(
            sink,
            frames,
            config,
            Box::new(ProportionalBatch::new(config.batch_divisor)),
        )
    }

    /// Create a scheduler with a custom batch policy.
    ///
    /// `config.batch_divisor` is ignored.
    pub fn with_policy(
        sink: S,
        frames: F,
        config: RevealConfig,
        policy: Box<dyn BatchPolicy>,
    ) -> Self {
        Self {
            sink,
            frames,
            policy,
            segmenter: config.segmentation,
            min_delay: config.min_delay,
            queue: VecDeque::new(),
            revealed: String::new(),
            last_publish: None,
            stream_ended: false,
            phase: RevealPhase::Idle,
            pending: None,
        }
    }

    // === Accessors ===

    /// Text revealed so far (baseline plus drained units).
    pub fn revealed_text(&self) -> &str {
        &self.revealed
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    /// Units waiting to be revealed.
    pub fn queued_units(&self) -> usize {
        self.queue.len()
    }

    /// Whether the producer signalled the end of the stream.
    pub fn is_stream_ended(&self) -> bool {
        self.stream_ended
    }

    /// Whether the final text has been published.
    pub fn is_finished(&self) -> bool {
        self.phase == RevealPhase::Finished
    }

    /// Handle of the currently requested tick, if any.
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Whether `handle` is this scheduler's pending tick.
    pub fn owns(&self, handle: TickHandle) -> bool {
        self.pending == Some(handle)
    }

    /// Borrow the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    // === Operations ===

    /// Segment `chunk` and append its units to the queue.
    ///
    /// Returns `false` (and does nothing) once the scheduler is finished or
    /// disposed; `reset` reopens a finished scheduler.
    pub fn enqueue(&mut self, chunk: &str) -> bool {
        match self.phase {
            RevealPhase::Disposed => {
                debug!(len = chunk.len(), "Enqueue after dispose ignored");
                return false;
            }
            RevealPhase::Finished => {
                debug!(len = chunk.len(), "Enqueue after finish ignored");
                return false;
            }
            RevealPhase::Idle => {
                debug!("Reveal stream started");
                self.phase = RevealPhase::Streaming;
            }
            RevealPhase::Streaming | RevealPhase::Draining => {}
        }

        let before = self.queue.len();
        self.queue.extend(
            self.segmenter
                .segment(chunk)
                .into_iter()
                .map(str::to_owned),
        );
        trace!(units = self.queue.len() - before, queued = self.queue.len(), "Chunk enqueued");

        if !self.queue.is_empty() {
            self.ensure_scheduled();
        }
        true
    }

    /// Signal that no more chunks will arrive.
    ///
    /// Does not flush; the next tick drains the remainder and the one after
    /// publishes the final text.
    pub fn mark_stream_ended(&mut self) {
        match self.phase {
            RevealPhase::Disposed | RevealPhase::Finished => return,
            RevealPhase::Idle | RevealPhase::Streaming | RevealPhase::Draining => {}
        }
        self.stream_ended = true;
        self.phase = RevealPhase::Draining;
        debug!(queued = self.queue.len(), "Reveal stream ended");
        self.ensure_scheduled();
    }

    /// Advance the reveal by one frame.
    ///
    /// `handle` must be the tick this scheduler requested; anything else is
    /// stale and ignored, which makes late frame callbacks after `reset` or
    /// `dispose` harmless.
    pub fn tick(&mut self, handle: TickHandle, now: Instant) -> TickOutcome {
        if self.pending != Some(handle) {
            trace!(handle = handle.get(), "Stale tick ignored");
            return TickOutcome::Stale;
        }
        self.pending = None;

        if self.queue.is_empty() {
            if self.stream_ended {
                self.sink.on_finish(&self.revealed);
                self.phase = RevealPhase::Finished;
                debug!(len = self.revealed.len(), "Reveal finished");
                return TickOutcome::Finished;
            }
            self.ensure_scheduled();
            return TickOutcome::Waiting;
        }

        if let Some(last) = self.last_publish {
            if now.saturating_duration_since(last) < self.min_delay {
                self.ensure_scheduled();
                return TickOutcome::Throttled;
            }
        }

        let batch = match self.batch_size() {
            Ok(batch) => batch,
            Err(err) => {
                warn!(error = %err, queued = self.queue.len(), "Reveal batch failed; retrying next frame");
                self.ensure_scheduled();
                return TickOutcome::Recovered;
            }
        };

        for unit in self.queue.drain(..batch) {
            self.revealed.push_str(&unit);
        }
        self.last_publish = Some(now);
        self.sink.on_reveal(&self.revealed);
        trace!(units = batch, queued = self.queue.len(), "Revealed batch");

        if !self.queue.is_empty() || self.stream_ended {
            self.ensure_scheduled();
        }
        TickOutcome::Revealed { units: batch }
    }

    /// Cancel pending work and restart from `baseline`.
    ///
    /// Publishes the baseline synchronously and returns to `Idle`. Reopens a
    /// finished scheduler. No-op after dispose.
    pub fn reset(&mut self, baseline: impl Into<String>) {
        if self.phase == RevealPhase::Disposed {
            return;
        }
        self.cancel_pending();
        self.queue.clear();
        self.revealed = baseline.into();
        self.stream_ended = false;
        self.last_publish = None;
        self.phase = RevealPhase::Idle;
        debug!(baseline_len = self.revealed.len(), "Reveal reset");
        self.sink.on_reveal(&self.revealed);
    }

    /// Tear down: cancel the pending tick and refuse all further work.
    pub fn dispose(&mut self) {
        if self.phase == RevealPhase::Disposed {
            return;
        }
        self.cancel_pending();
        self.queue.clear();
        self.phase = RevealPhase::Disposed;
        debug!("Reveal scheduler disposed");
    }

    // === Internals ===

    fn batch_size(&self) -> Result<usize, RevealError> {
        let queued = self.queue.len();
        if self.stream_ended {
            return Ok(queued);
        }
        let size = self.policy.batch_size(queued)?;
        if size == 0 || size > queued {
            return Err(RevealError::BatchOutOfRange { size, queued });
        }
        Ok(size)
    }

    fn ensure_scheduled(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.frames.request_tick());
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.frames.cancel_tick(handle);
        }
    }
}

impl<S: RevealSink, F: FrameScheduler> Drop for RevealScheduler<S, F> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
