//! Deterministic bursty replay of text as a token stream.
//!
//! Stands in for a chat backend: each message is cut into chunks whose
//! sizes cycle between a minimum and a maximum (in chars), and one chunk is
//! released per interval.

use std::time::{Duration, Instant};

/// Default smallest chunk, in chars.
pub const DEFAULT_CHUNK_MIN: usize = 1;
/// Default largest chunk, in chars.
pub const DEFAULT_CHUNK_MAX: usize = 12;
/// Default time between chunks.
pub const DEFAULT_CHUNK_INTERVAL: Duration = Duration::from_millis(30);

/// Chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayConfig {
    /// Smallest chunk, in chars. At least 1.
    pub chunk_min: usize,
    /// Largest chunk, in chars. At least `chunk_min`.
    pub chunk_max: usize,
    /// Time between two chunks.
    pub chunk_interval: Duration,
}

impl ReplayConfig {
    /// Build a config, clamping `chunk_min` to at least 1 and `chunk_max`
    /// to at least `chunk_min`.
    pub fn new(chunk_min: usize, chunk_max: usize, chunk_interval: Duration) -> Self {
        let chunk_min = chunk_min.max(1);
        Self {
            chunk_min,
            chunk_max: chunk_max.max(chunk_min),
            chunk_interval,
        }
    }

    /// Size of the `n`th chunk. Cycles through the range with a stride
    /// that makes consecutive chunks uneven.
    fn chunk_size(&self, n: usize) -> usize {
        let span = self.chunk_max - self.chunk_min + 1;
        self.chunk_min + (n.wrapping_mul(7)) % span
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_MIN, DEFAULT_CHUNK_MAX, DEFAULT_CHUNK_INTERVAL)
    }
}

/// Something the replay produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayEvent {
    /// Message `index` starts streaming.
    MessageStart {
        /// Position of the message in the input.
        index: usize,
    },
    /// Next fragment of the current message.
    Chunk(String),
    /// Message `index` has no more chunks.
    MessageEnd {
        /// Position of the message in the input.
        index: usize,
    },
    /// Every message was replayed.
    Finished,
}

/// Replays messages chunk by chunk on a clock.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    messages: Vec<String>,
    config: ReplayConfig,
    message_index: usize,
    /// Byte offset into the current message.
    offset: usize,
    in_message: bool,
    chunks_emitted: usize,
    next_due: Option<Instant>,
    finished: bool,
}

impl ReplaySource {
    /// Replay `messages` in order.
    pub fn new(messages: Vec<String>, config: ReplayConfig) -> Self {
        Self {
            messages,
            config,
            message_index: 0,
            offset: 0,
            in_message: false,
            chunks_emitted: 0,
            next_due: None,
            finished: false,
        }
    }

    /// Number of messages being replayed.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// True once [`ReplayEvent::Finished`] was produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Every event due at `now`.
    ///
    /// The first call releases the first chunk immediately. Message
    /// boundaries take no time; each chunk takes one interval.
    pub fn poll(&mut self, now: Instant) -> Vec<ReplayEvent> {
        let mut events = Vec::new();
        let mut due = *self.next_due.get_or_insert(now);

        while !self.finished && due <= now {
            let Some(event) = self.step() else {
                break;
            };
            if matches!(event, ReplayEvent::Chunk(_)) {
                due += self.config.chunk_interval;
            }
            events.push(event);
        }

        self.next_due = Some(due);
        events
    }

    /// Drain every remaining event regardless of time.
    pub fn drain_all(&mut self) -> Vec<ReplayEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.step() {
            events.push(event);
        }
        events
    }

    fn step(&mut self) -> Option<ReplayEvent> {
        if self.finished {
            return None;
        }

        if !self.in_message {
            if self.message_index >= self.messages.len() {
                self.finished = true;
                return Some(ReplayEvent::Finished);
            }
            self.in_message = true;
            self.offset = 0;
            return Some(ReplayEvent::MessageStart {
                index: self.message_index,
            });
        }

        let message = &self.messages[self.message_index];
        if self.offset >= message.len() {
            let index = self.message_index;
            self.in_message = false;
            self.message_index += 1;
            return Some(ReplayEvent::MessageEnd { index });
        }

        let size = self.config.chunk_size(self.chunks_emitted);
        let rest = &message[self.offset..];
        let end = rest
            .char_indices()
            .nth(size)
            .map_or(rest.len(), |(byte, _)| byte);
        let chunk = rest[..end].to_string();

        self.offset += end;
        self.chunks_emitted += 1;
        Some(ReplayEvent::Chunk(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks_of(events: &[ReplayEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                ReplayEvent::Chunk(chunk) => Some(chunk.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn config_new_clamps_bounds() {
        let config = ReplayConfig::new(0, 0, Duration::ZERO);
        assert_eq!(config.chunk_min, 1);
        assert_eq!(config.chunk_max, 1);

        let config = ReplayConfig::new(5, 2, Duration::ZERO);
        assert_eq!(config.chunk_max, 5);
    }

    #[test]
    fn chunk_sizes_stay_in_range() {
        let config = ReplayConfig::new(3, 9, Duration::ZERO);
        for n in 0..100 {
            let size = config.chunk_size(n);
            assert!((3..=9).contains(&size), "size {size} out of range");
        }
    }

    #[test]
    fn drain_all_produces_framed_messages() {
        let mut source = ReplaySource::new(
            vec!["Hello World".to_string(), "Bye".to_string()],
            ReplayConfig::new(4, 4, Duration::ZERO),
        );

        let events = source.drain_all();

        assert_eq!(
            events,
            vec![
                ReplayEvent::MessageStart { index: 0 },
                ReplayEvent::Chunk("Hell".to_string()),
                ReplayEvent::Chunk("o Wo".to_string()),
                ReplayEvent::Chunk("rld".to_string()),
                ReplayEvent::MessageEnd { index: 0 },
                ReplayEvent::MessageStart { index: 1 },
                ReplayEvent::Chunk("Bye".to_string()),
                ReplayEvent::MessageEnd { index: 1 },
                ReplayEvent::Finished,
            ]
        );
        assert!(source.is_finished());
        assert!(source.drain_all().is_empty());
    }

    #[test]
    fn chunks_concatenate_to_message() {
        let text = "naïve café 👩‍👩‍👧 日本語のテキスト";
        let mut source = ReplaySource::new(vec![text.to_string()], ReplayConfig::new(1, 5, Duration::ZERO));

        let events = source.drain_all();

        assert_eq!(chunks_of(&events).concat(), text);
    }

    #[test]
    fn poll_releases_one_chunk_per_interval() {
        let start = Instant::now();
        let interval = Duration::from_millis(30);
        let mut source = ReplaySource::new(
            vec!["abcdefghij".to_string()],
            ReplayConfig::new(2, 2, interval),
        );

        let first = source.poll(start);
        assert_eq!(
            first,
            vec![
                ReplayEvent::MessageStart { index: 0 },
                ReplayEvent::Chunk("ab".to_string())
            ]
        );

        assert!(source.poll(start + Duration::from_millis(10)).is_empty());

        let second = source.poll(start + interval);
        assert_eq!(chunks_of(&second), vec!["cd"]);

        // A late poll catches up on every missed chunk
        let late = source.poll(start + interval * 4);
        assert_eq!(chunks_of(&late), vec!["ef", "gh", "ij"]);
    }

    #[test]
    fn poll_with_zero_interval_drains_everything() {
        let mut source = ReplaySource::new(
            vec!["abc".to_string(), "def".to_string()],
            ReplayConfig::new(1, 1, Duration::ZERO),
        );

        let events = source.poll(Instant::now());

        assert_eq!(chunks_of(&events).concat(), "abcdef");
        assert_eq!(events.last(), Some(&ReplayEvent::Finished));
    }

    #[test]
    fn empty_input_finishes_immediately() {
        let mut source = ReplaySource::new(Vec::new(), ReplayConfig::default());
        assert_eq!(source.poll(Instant::now()), vec![ReplayEvent::Finished]);
        assert!(source.is_finished());
    }
}
