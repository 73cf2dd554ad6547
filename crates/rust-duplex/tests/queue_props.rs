//! Property tests for queue ordering and accumulator compaction.

use proptest::prelude::*;
use rust_duplex::{Command, CommandQueue, DuplexConfig, InputBuffer, Timing};

fn names(queue: &CommandQueue) -> Vec<String> {
    queue.iter().map(|q| q.command().command().to_string()).collect()
}

proptest! {
    #[test]
    fn prop_tail_fills_in_order_then_rejects(capacity in 1usize..12) {
        let mut queue = CommandQueue::new(&DuplexConfig::new().queue_capacity(capacity));
        let expected: Vec<String> = (0..capacity).map(|i| format!("CMD{i}")).collect();
        for name in &expected {
            prop_assert!(queue.push(Command::new(name.as_str(), "OK"), Timing::Tail, 0).is_ok());
        }

        let err = queue.push(Command::new("EXTRA", "OK"), Timing::Tail, 0).unwrap_err();
        prop_assert!(err.is_queue_full());
        prop_assert_eq!(names(&queue), expected);
    }

    #[cfg(feature = "mock")]
    #[test]
    fn prop_in_flight_head_never_displaced(
        inserts in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        use rust_duplex::{Duplex, DuplexBuilder, ManualClock, MockChannel};

        let mut duplex: Duplex<MockChannel, ManualClock> = DuplexBuilder::new()
            .config(DuplexConfig::new().queue_capacity(16))
            .clock(ManualClock::new())
            .begin(MockChannel::new())
            .unwrap();
        duplex.enqueue(Command::new("SENT", "OK"), Timing::Tail).unwrap();
        duplex.poll().unwrap();

        for (i, head) in inserts.iter().enumerate() {
            let timing = if *head { Timing::Head } else { Timing::Tail };
            duplex.enqueue(Command::new(format!("C{i}"), "OK"), timing).unwrap();
            let first = duplex.queued().next().map(|q| q.command().command().to_string());
            prop_assert_eq!(first.as_deref(), Some("SENT"));
        }
    }

    #[test]
    fn prop_buffer_keeps_newest_bytes(
        capacity in 1usize..64,
        data in prop::collection::vec(1u8..=255, 0..200),
    ) {
        let mut buffer = InputBuffer::new(capacity);
        buffer.extend(&data);

        let keep = data.len().min(capacity);
        prop_assert_eq!(buffer.len(), keep);
        prop_assert_eq!(buffer.as_slice(), &data[data.len() - keep..]);
        prop_assert_eq!(buffer.bytes_evicted(), (data.len() - keep) as u64);
    }

    #[test]
    fn prop_consume_preserves_suffix(
        data in prop::collection::vec(any::<u8>(), 0..128),
        end in 0usize..160,
    ) {
        let mut buffer = InputBuffer::new(128);
        buffer.extend(&data);
        let removed = buffer.consume(end);

        prop_assert_eq!(removed, end.min(data.len()));
        prop_assert_eq!(buffer.as_slice(), &data[removed..]);
    }
}
