//! Matching and polling benchmarks.
#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rust_duplex::{
    Command, DuplexBuilder, InputBuffer, LiteralMatcher, ManualClock, MockChannel, PatternMatcher,
    RegexMatcher, Timing,
};

fn bench_literal_matcher(c: &mut Criterion) {
    let haystack = b"AT+CGMI\r\nQuectel\r\n\r\nOK\r\n";

    c.bench_function("literal_matcher_find", |b| {
        b.iter(|| LiteralMatcher.find(black_box("OK"), black_box(haystack)));
    });
}

fn bench_regex_matcher(c: &mut Criterion) {
    let matcher = RegexMatcher::new();
    let haystack = b"+CSQ: 17,99\r\n\r\nOK\r\n";

    c.bench_function("regex_matcher_cached", |b| {
        b.iter(|| matcher.find(black_box(r"\+CSQ: (\d+),(\d+)"), black_box(haystack)));
    });
}

fn bench_accumulator_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_against_full_buffer");
    let matcher = RegexMatcher::new();

    for size in &[64usize, 256, 512, 1024] {
        let mut buffer = InputBuffer::new(*size);
        for i in 0..*size {
            buffer.push(b'a' + (i % 26) as u8);
        }

        let haystack = buffer.as_slice();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| matcher.find(black_box("OK"), haystack));
        });
    }

    group.finish();
}

fn bench_sliding_window(c: &mut Criterion) {
    c.bench_function("buffer_push_evicting_1k", |b| {
        b.iter(|| {
            let mut buffer = InputBuffer::new(512);
            for i in 0..1000u32 {
                buffer.push((i % 255 + 1) as u8);
            }
            black_box(buffer)
        });
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let modem = MockChannel::new();
    let mut duplex = DuplexBuilder::new()
        .clock(ManualClock::new())
        .begin(modem.clone())
        .unwrap();

    c.bench_function("command_round_trip", |b| {
        b.iter(|| {
            duplex
                .enqueue(Command::new("AT", "OK"), Timing::Tail)
                .unwrap();
            duplex.poll().unwrap();
            modem.queue_input_str("\r\nOK\r\n");
            duplex.poll().unwrap();
            black_box(modem.take_output());
        });
    });
}

criterion_group!(
    benches,
    bench_literal_matcher,
    bench_regex_matcher,
    bench_accumulator_sizes,
    bench_sliding_window,
    bench_round_trip,
);
criterion_main!(benches);
