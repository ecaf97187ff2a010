//! Property-based tests for the reveal pipeline.
//!
//! Properties Under Test:
//! - Segmentation round-trips: joining the units gives back the input
//! - Conservation: after stream end and full drain, the revealed text is
//!   the concatenation of every enqueued chunk, whatever the timing
//! - Throttle: two batch publishes are never closer than the minimum delay
//! - Batch formula: `max(1, n / 5)`, never more than `n`

use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tokflow::reveal::{
    segment, segment_codepoints, BatchPolicy, FrameQueue, ProportionalBatch, RevealBuffer,
    RevealConfig, RevealScheduler, Segmenter, TickOutcome,
};

// ===== Arbitrary Strategies =====

/// Text mixing ASCII, combining marks, emoji ZWJ sequences and CJK.
fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-zA-Z0-9 ,.!?]{1,8}",
            Just("e\u{301}".to_string()),
            Just("👩‍👩‍👧".to_string()),
            Just("🇯🇵".to_string()),
            Just("日本語".to_string()),
            Just("\r\n".to_string()),
            any::<char>().prop_map(String::from),
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

/// One step of host activity between chunks.
#[derive(Debug, Clone)]
enum Step {
    Enqueue(String),
    Frame { millis: u64 },
}

fn arb_steps() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(
        prop_oneof![
            arb_text().prop_map(Step::Enqueue),
            (0u64..40).prop_map(|millis| Step::Frame { millis }),
        ],
        0..30,
    )
}

fn arb_config() -> impl Strategy<Value = RevealConfig> {
    (0u64..50, 1usize..10, prop::bool::ANY).prop_map(|(delay, divisor, graphemes)| RevealConfig {
        min_delay: Duration::from_millis(delay),
        batch_divisor: divisor,
        segmentation: if graphemes {
            Segmenter::Graphemes
        } else {
            Segmenter::Codepoints
        },
    })
}

// ===== Properties =====

proptest! {
    #[test]
    fn grapheme_segments_round_trip(text in arb_text()) {
        prop_assert_eq!(segment(&text).concat(), text.clone());
        prop_assert_eq!(segment_codepoints(&text).concat(), text);
    }

    #[test]
    fn no_grapheme_segment_is_empty(text in arb_text()) {
        prop_assert!(segment(&text).iter().all(|unit| !unit.is_empty()));
    }

    #[test]
    fn batch_size_formula(n in 1usize..100_000) {
        let size = ProportionalBatch::default().batch_size(n).unwrap();
        prop_assert_eq!(size, (n / 5).max(1));
        prop_assert!(size <= n);
    }

    #[test]
    fn revealed_text_is_conserved(steps in arb_steps(), config in arb_config()) {
        let buffer = RevealBuffer::new();
        let frames = FrameQueue::new();
        let mut sched = RevealScheduler::new(buffer.clone(), frames.clone(), config);
        let mut expected = String::new();
        let mut now = Instant::now();

        for step in steps {
            match step {
                Step::Enqueue(chunk) => {
                    prop_assert!(sched.enqueue(&chunk));
                    expected.push_str(&chunk);
                }
                Step::Frame { millis } => {
                    now += Duration::from_millis(millis);
                    for handle in frames.take_due() {
                        sched.tick(handle, now);
                    }
                    prop_assert!(expected.starts_with(&buffer.text()));
                }
            }
        }

        sched.mark_stream_ended();
        for _ in 0..1_000 {
            let due = frames.take_due();
            if due.is_empty() {
                break;
            }
            now += Duration::from_millis(16);
            for handle in due {
                sched.tick(handle, now);
            }
        }

        prop_assert!(sched.is_finished());
        prop_assert!(buffer.is_finished());
        prop_assert_eq!(buffer.text(), expected);
    }

    #[test]
    fn publishes_respect_min_delay(
        chunks in prop::collection::vec(arb_text(), 1..6),
        frame_gaps in prop::collection::vec(1u64..30, 50),
        delay in 1u64..40,
    ) {
        let config = RevealConfig {
            min_delay: Duration::from_millis(delay),
            ..RevealConfig::default()
        };
        let publish_count = Rc::new(RefCell::new(0usize));
        let sink = {
            let publish_count = Rc::clone(&publish_count);
            move |_: &str| *publish_count.borrow_mut() += 1
        };
        let frames = FrameQueue::new();
        let mut sched = RevealScheduler::new(sink, frames.clone(), config);
        for chunk in &chunks {
            sched.enqueue(chunk);
        }

        let mut now = Instant::now();
        let mut reveal_times = Vec::new();
        for gap in frame_gaps {
            now += Duration::from_millis(gap);
            for handle in frames.take_due() {
                if let TickOutcome::Revealed { .. } = sched.tick(handle, now) {
                    reveal_times.push(now);
                }
            }
        }

        prop_assert_eq!(reveal_times.len(), *publish_count.borrow());
        for pair in reveal_times.windows(2) {
            prop_assert!(pair[1] - pair[0] >= config.min_delay);
        }
    }
}
