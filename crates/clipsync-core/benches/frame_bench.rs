//! Criterion benchmarks for the clipsync frame codec.
//!
//! Measures encode and decode cost across clipboard payload sizes, from a
//! keepalive up to a 1 MiB paste.
//!
//! Run with:
//! ```bash
//! cargo bench --package clipsync-core --bench frame_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use clipsync_core::protocol::{decode_frame, encode_frame};

// ── Payload fixtures ──────────────────────────────────────────────────────────

fn payloads() -> Vec<(&'static str, String)> {
    vec![
        ("keepalive", String::new()),
        ("url_80B", "https://example.com/some/fairly/long/path?with=query&params=1".to_string()),
        ("paragraph_4KiB", "lorem ipsum ".repeat(4096 / 12)),
        ("multibyte_64KiB", "héllo wörld ✓ ".repeat(64 * 1024 / 19)),
        ("paste_1MiB", "x".repeat(1024 * 1024)),
    ]
}

// ── Benchmark groups ──────────────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_frame");
    for (name, content) in payloads() {
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::new("payload", name), &content, |b, content| {
            b.iter(|| encode_frame(black_box(content)).expect("encode must succeed"))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_frame");
    for (name, content) in payloads() {
        let bytes = encode_frame(&content).expect("fixture must encode");
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("payload", name), &bytes, |b, bytes| {
            b.iter(|| decode_frame(black_box(bytes)).expect("decode must succeed"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
