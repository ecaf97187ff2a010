//! Transcript - replayed messages flowing through reveal schedulers into a
//! windowed list.
//!
//! Messages reveal one at a time: the next message starts only after the
//! previous one finished draining, so only the last list item ever streams.

use super::wrap::wrap_lines;
use crate::config::ResolvedConfig;
use crate::model::{ItemId, ListItem};
use crate::reveal::{FrameQueue, RevealBuffer, RevealConfig, RevealScheduler, TickOutcome};
use crate::source::ReplayEvent;
use crate::view_state::{ListWindow, RenderCache, Viewport, WindowedList};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Memoized wrapped lines, keyed by (width, source text).
pub type WrapCache = RenderCache<Vec<String>, (u16, String)>;

/// Upper bound on measure/re-window rounds per frame.
const MAX_MEASURE_PASSES: usize = 4;

/// One message in the transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// Text revealed so far.
    pub text: String,
    /// True while the reveal is still running.
    pub streaming: bool,
}

/// The message currently being revealed.
struct ActiveReveal {
    scheduler: RevealScheduler<RevealBuffer, FrameQueue>,
    buffer: RevealBuffer,
    seen_version: u64,
}

/// Replayed conversation state: list, frame queue, and the active reveal.
pub struct Transcript {
    list: WindowedList<TranscriptEntry>,
    frames: FrameQueue,
    reveal_config: RevealConfig,
    active: Option<ActiveReveal>,
    pending: VecDeque<ReplayEvent>,
    replay_finished: bool,
}

impl Transcript {
    /// Empty transcript using the resolved configuration.
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            list: WindowedList::new(config.list),
            frames: FrameQueue::new(),
            reveal_config: config.reveal,
            active: None,
            pending: VecDeque::new(),
            replay_finished: false,
        }
    }

    /// Feed replay events. Events for a later message wait until the
    /// current one finished revealing.
    pub fn apply(&mut self, events: impl IntoIterator<Item = ReplayEvent>) {
        self.pending.extend(events);
        self.pump();
    }

    /// Deliver every frame tick that is due and sync revealed text into
    /// the list. Returns true when any entry changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let due = self.frames.take_due();
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        for handle in due {
            match active.scheduler.tick(handle, now) {
                TickOutcome::Stale => trace!(handle = handle.get(), "Stale tick"),
                TickOutcome::Recovered => warn!("Reveal tick recovered from batch error"),
                _ => {}
            }
        }

        let version = active.buffer.version();
        if version == active.seen_version {
            return false;
        }
        active.seen_version = version;

        let text = active.buffer.text();
        let finished = active.buffer.is_finished();
        self.list.update_last(|entry| {
            entry.text = text;
            entry.streaming = !finished;
        });

        if finished {
            self.pump();
        }
        true
    }

    /// Measure wrapped heights of materialized entries at `width` and feed
    /// them to the list until the window is stable.
    pub fn measure(&mut self, width: u16, cache: &mut WrapCache) {
        for _ in 0..MAX_MEASURE_PASSES {
            let window = self.list.window();
            let measurements: Vec<(ItemId, f64)> = self.list.items()[window.range()]
                .iter()
                .map(|item| (item.id().clone(), entry_height(item.content(), width, cache)))
                .collect();

            let mut changed = false;
            for (id, height) in measurements {
                changed |= self.list.on_height_measured(&id, height).is_some();
            }
            if !changed {
                break;
            }
        }
    }

    /// Rows to draw for the current viewport at `width`.
    pub fn visible_lines(&self, width: u16, cache: &mut WrapCache) -> Vec<String> {
        let window = self.list.window();
        let viewport = self.list.viewport();
        let extent = viewport.extent.max(0.0) as usize;
        let skip = (viewport.scroll_offset - window.leading_spacer).max(0.0) as usize;

        self.list.items()[window.range()]
            .iter()
            .flat_map(|item| {
                let mut lines = entry_lines(item.content(), width, cache);
                lines.push(String::new());
                lines
            })
            .skip(skip)
            .take(extent)
            .collect()
    }

    /// Resize the viewport, keeping the end pinned if it was.
    pub fn set_extent(&mut self, extent: f64) {
        let viewport = self.list.viewport();
        if viewport.extent == extent {
            return;
        }
        let was_sticky = self.list.is_sticky();
        self.list.set_viewport(Viewport::new(viewport.scroll_offset, extent));
        if was_sticky {
            self.list.scroll_to_end();
        }
    }

    /// Scroll by `rows`, clamped to the content.
    pub fn scroll_by(&mut self, rows: f64) {
        let viewport = self.list.viewport();
        let max = (self.list.total_extent() - viewport.extent).max(0.0);
        let offset = (viewport.scroll_offset + rows).clamp(0.0, max);
        self.list.set_viewport(viewport.with_offset(offset));
    }

    /// Jump to the top.
    pub fn scroll_to_top(&mut self) {
        let viewport = self.list.viewport();
        self.list.set_viewport(viewport.with_offset(0.0));
    }

    /// Jump to the end and follow new content again.
    pub fn scroll_to_end(&mut self) {
        self.list.scroll_to_end();
    }

    /// The underlying list.
    pub fn list(&self) -> &WindowedList<TranscriptEntry> {
        &self.list
    }

    /// Current window.
    pub fn window(&self) -> ListWindow {
        self.list.window()
    }

    /// True while a message is still revealing or replay events wait.
    pub fn is_streaming(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.scheduler.is_finished())
            || !self.pending.is_empty()
    }

    /// True once the replay ended and everything was revealed.
    pub fn is_complete(&self) -> bool {
        self.replay_finished && !self.is_streaming()
    }

    /// Ticks requested and not yet delivered.
    pub fn outstanding_ticks(&self) -> usize {
        self.frames.outstanding()
    }

    fn pump(&mut self) {
        while let Some(event) = self.pending.front() {
            if matches!(event, ReplayEvent::MessageStart { .. }) && self.is_revealing() {
                break;
            }
            let Some(event) = self.pending.pop_front() else {
                break;
            };
            self.handle_event(event);
        }
    }

    fn is_revealing(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.scheduler.is_finished())
    }

    fn handle_event(&mut self, event: ReplayEvent) {
        match event {
            ReplayEvent::MessageStart { index } => self.start_message(index),
            ReplayEvent::Chunk(chunk) => match self.active.as_mut() {
                Some(active) => {
                    active.scheduler.enqueue(&chunk);
                }
                None => warn!("Chunk arrived outside a message"),
            },
            ReplayEvent::MessageEnd { index } => {
                debug!(index, "Message stream ended");
                if let Some(active) = self.active.as_mut() {
                    active.scheduler.mark_stream_ended();
                }
            }
            ReplayEvent::Finished => {
                info!(messages = self.list.len(), "Replay finished");
                self.replay_finished = true;
            }
        }
    }

    fn start_message(&mut self, index: usize) {
        let id = match ItemId::new(format!("msg-{index}")) {
            Ok(id) => id,
            Err(e) => {
                warn!(index, error = %e, "Cannot create message id");
                return;
            }
        };

        let entry = TranscriptEntry {
            text: String::new(),
            streaming: true,
        };
        if !self.list.push(ListItem::new(id, entry)).applied {
            return;
        }

        let buffer = RevealBuffer::new();
        let scheduler =
            RevealScheduler::new(buffer.clone(), self.frames.clone(), self.reveal_config);
        // Dropping the previous scheduler cancels any tick it still holds.
        self.active = Some(ActiveReveal {
            scheduler,
            buffer,
            seen_version: 0,
        });
        debug!(index, "Message started");
    }
}

/// Wrapped lines of an entry. Finished entries go through the cache;
/// streaming text changes every frame and is wrapped directly.
fn entry_lines(entry: &TranscriptEntry, width: u16, cache: &mut WrapCache) -> Vec<String> {
    if entry.streaming {
        return wrap_lines(&entry.text, width);
    }
    cache.get_or_insert_with((width, entry.text.clone()), || {
        wrap_lines(&entry.text, width)
    })
}

/// Rows an entry occupies: its wrapped lines plus one separator row.
fn entry_height(entry: &TranscriptEntry, width: u16, cache: &mut WrapCache) -> f64 {
    (entry_lines(entry, width, cache).len() + 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ReplayConfig, ReplaySource};
    use std::time::Duration;

    fn config() -> ResolvedConfig {
        let mut config = ResolvedConfig::default();
        config.reveal.min_delay = Duration::from_millis(10);
        config.list.estimated_height = 2.0;
        config.list.buffer_count = 1;
        config
    }

    /// Run frames 20ms apart until nothing is left to reveal.
    fn run_to_completion(transcript: &mut Transcript, mut now: Instant) -> Instant {
        for _ in 0..1_000 {
            transcript.tick(now);
            if !transcript.is_streaming() {
                break;
            }
            now += Duration::from_millis(20);
        }
        now
    }

    fn texts(transcript: &Transcript) -> Vec<String> {
        transcript
            .list()
            .items()
            .iter()
            .map(|item| item.content().text.clone())
            .collect()
    }

    #[test]
    fn replayed_messages_are_fully_revealed_in_order() {
        let mut transcript = Transcript::new(&config());
        let mut source = ReplaySource::new(
            vec!["Hello World".to_string(), "Second message here".to_string()],
            ReplayConfig::new(2, 5, Duration::ZERO),
        );

        transcript.apply(source.drain_all());
        run_to_completion(&mut transcript, Instant::now());

        assert!(transcript.is_complete());
        assert_eq!(texts(&transcript), vec!["Hello World", "Second message here"]);
        assert!(transcript.list().items().iter().all(|item| !item.content().streaming));
        assert_eq!(transcript.outstanding_ticks(), 0);
    }

    #[test]
    fn next_message_waits_for_current_reveal() {
        let mut transcript = Transcript::new(&config());
        transcript.apply(vec![
            ReplayEvent::MessageStart { index: 0 },
            ReplayEvent::Chunk("first".to_string()),
            ReplayEvent::MessageEnd { index: 0 },
            ReplayEvent::MessageStart { index: 1 },
            ReplayEvent::Chunk("second".to_string()),
        ]);

        assert_eq!(transcript.list().len(), 1);
        assert!(transcript.is_streaming());

        run_to_completion(&mut transcript, Instant::now());

        assert_eq!(transcript.list().len(), 2);
        assert_eq!(texts(&transcript)[0], "first");
        // Second message never got its end marker: revealed but still open
        assert_eq!(texts(&transcript)[1], "second");
        assert!(transcript.list().items()[1].content().streaming);
    }

    #[test]
    fn tick_without_active_message_changes_nothing() {
        let mut transcript = Transcript::new(&config());
        assert!(!transcript.tick(Instant::now()));
    }

    #[test]
    fn measure_uses_wrapped_heights() {
        let mut transcript = Transcript::new(&config());
        transcript.set_extent(10.0);
        transcript.apply(vec![
            ReplayEvent::MessageStart { index: 0 },
            ReplayEvent::Chunk("aaaa bbbb cccc".to_string()),
            ReplayEvent::MessageEnd { index: 0 },
        ]);
        run_to_completion(&mut transcript, Instant::now());

        let mut cache = WrapCache::new(16);
        transcript.measure(4, &mut cache);

        // Three wrapped lines plus the separator row
        let id = ItemId::new("msg-0").unwrap();
        assert_eq!(transcript.list().height_of(&id), Some(4.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn visible_lines_respect_scroll_offset() {
        let mut transcript = Transcript::new(&config());
        transcript.apply((0..5).flat_map(|i| {
            vec![
                ReplayEvent::MessageStart { index: i },
                ReplayEvent::Chunk(format!("message {i}")),
                ReplayEvent::MessageEnd { index: i },
            ]
        }));
        run_to_completion(&mut transcript, Instant::now());

        let mut cache = WrapCache::new(16);
        transcript.set_extent(3.0);
        transcript.scroll_to_top();
        transcript.measure(80, &mut cache);
        assert_eq!(
            transcript.visible_lines(80, &mut cache),
            vec!["message 0", "", "message 1"]
        );

        transcript.scroll_by(2.0);
        transcript.measure(80, &mut cache);
        assert_eq!(
            transcript.visible_lines(80, &mut cache),
            vec!["message 1", "", "message 2"]
        );
    }

    #[test]
    fn follows_end_while_streaming() {
        let mut transcript = Transcript::new(&config());
        let mut cache = WrapCache::new(16);
        transcript.set_extent(4.0);

        let mut now = Instant::now();
        for i in 0..6 {
            transcript.apply(vec![
                ReplayEvent::MessageStart { index: i },
                ReplayEvent::Chunk(format!("line {i}")),
                ReplayEvent::MessageEnd { index: i },
            ]);
            now = run_to_completion(&mut transcript, now);
            transcript.measure(80, &mut cache);
        }

        assert!(transcript.list().is_sticky());
        let lines = transcript.visible_lines(80, &mut cache);
        assert_eq!(lines, vec!["line 4", "", "line 5", ""]);
    }

    #[test]
    fn scrolling_up_stops_following() {
        let mut transcript = Transcript::new(&config());
        let mut cache = WrapCache::new(16);
        transcript.set_extent(4.0);
        transcript.apply((0..6).flat_map(|i| {
            vec![
                ReplayEvent::MessageStart { index: i },
                ReplayEvent::Chunk(format!("line {i}")),
                ReplayEvent::MessageEnd { index: i },
            ]
        }));
        run_to_completion(&mut transcript, Instant::now());
        transcript.measure(80, &mut cache);

        transcript.scroll_to_top();
        assert!(!transcript.list().is_sticky());

        transcript.scroll_to_end();
        assert!(transcript.list().is_sticky());
    }
}
