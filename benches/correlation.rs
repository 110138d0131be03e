//! Correlation benchmark suite.
//!
//! Measures the hot path of an action call without a network:
//! - Request ID allocation
//! - Register, resolve and await of pending calls at different depths
//! - Frame classification of results and events
//!
//! Run with: cargo bench --bench correlation
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use onebot_bridge::correlation::{PendingCalls, SequenceAllocator};
use onebot_bridge::protocol::Frame;
use onebot_bridge::ActionResponse;
use serde_json::json;
use tokio::runtime::Runtime;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const IN_FLIGHT: &[usize] = &[1, 64, 512];

const RESULT_FRAME: &str =
    r#"{"status":"ok","retcode":0,"data":{"message_id":42},"echo":1337}"#;

const EVENT_FRAME: &str = r#"{"time":1700000000,"self_id":10001,"post_type":"message","message_type":"group","group_id":10,"user_id":2000,"message":[{"type":"text","data":{"text":"hi"}}],"raw_message":"hi"}"#;

// ============================================================================
// Benchmark: Sequence Allocation
// ============================================================================

fn bench_sequence(c: &mut Criterion) {
    let sequence = SequenceAllocator::new();

    c.bench_function("sequence_next", |b| {
        b.iter(|| black_box(sequence.next()));
    });
}

// ============================================================================
// Benchmark: Register / Resolve
// ============================================================================

fn bench_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");

    let mut group = c.benchmark_group("round_trip");

    for &depth in IN_FLIGHT {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::new("calls", depth), &depth, |b, &depth| {
            let sequence = SequenceAllocator::new();
            let pending = PendingCalls::with_capacity(depth);

            b.to_async(&rt).iter(|| {
                let sequence = &sequence;
                let pending = &pending;
                async move { round_trip(sequence, pending, depth).await }
            });
        });
    }

    group.finish();
}

async fn round_trip(sequence: &SequenceAllocator, pending: &PendingCalls, depth: usize) {
    let calls: Vec<_> = (0..depth)
        .map(|_| {
            pending
                .register(sequence.next())
                .expect("capacity is sized to depth")
        })
        .collect();

    for call in &calls {
        let response = ok_response(call.id().get());
        pending.resolve(call.id(), response);
    }

    for call in calls {
        let response = call
            .await_result(Duration::from_secs(1))
            .await
            .expect("resolved");
        black_box(response);
    }
}

fn ok_response(echo: u32) -> ActionResponse {
    serde_json::from_value(json!({"status": "ok", "data": null, "echo": echo}))
        .expect("valid response")
}

// ============================================================================
// Benchmark: Frame Classification
// ============================================================================

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    group.bench_function("result", |b| {
        b.iter(|| black_box(Frame::decode(black_box(RESULT_FRAME)).expect("result")));
    });

    group.bench_function("event", |b| {
        b.iter(|| black_box(Frame::decode(black_box(EVENT_FRAME)).expect("event")));
    });

    group.finish();
}

// ============================================================================
// Main
// ============================================================================

criterion_group!(benches, bench_sequence, bench_round_trip, bench_classify);
criterion_main!(benches);
