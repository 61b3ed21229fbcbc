//! Criterion benchmark untuk Ring Buffer
//!
//! Run dengan: cargo bench

use std::io::{self, Read};

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ringpipe::core::{OverflowPolicy, RingBuffer};
use ringpipe::reactor::EventLoop;
use ringpipe::test_utils::{ScriptedReadiness, ThrottledSink};

fn bench_pull_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");

    for capacity in [64usize, 4096, 65536].iter() {
        group.throughput(Throughput::Bytes((*capacity - 1) as u64));

        // Isi penuh dari source tak terbatas, lalu drain ke sink
        group.bench_function(format!("fill_drain_{}", capacity), |b| {
            let mut rb = RingBuffer::new(*capacity);
            let mut source = io::repeat(0x5a);
            let mut sink = io::sink();
            b.iter(|| {
                black_box(rb.pull(&mut source));
                black_box(rb.push(&mut sink).unwrap());
            });
        });
    }

    // Drop-oldest selalu menimpa; source di-limit supaya pull berhenti
    group.throughput(Throughput::Bytes(4096));
    group.bench_function("drop_oldest_overwrite", |b| {
        let mut rb = RingBuffer::with_policy(1024, OverflowPolicy::DropOldest);
        b.iter(|| {
            let mut source = io::repeat(0xa5).take(4096);
            black_box(rb.pull(&mut source));
        });
    });

    group.finish();
}

fn bench_event_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_loop");
    const STREAM_LEN: u64 = 1024 * 1024;

    for write_limit in [512usize, 8192].iter() {
        group.throughput(Throughput::Bytes(STREAM_LEN));
        group.bench_function(format!("stream_1mb_write_{}", write_limit), |b| {
            b.iter(|| {
                let mut pump =
                    EventLoop::new(ScriptedReadiness::always(), RingBuffer::new(16 * 1024));
                let mut source = io::repeat(0x42).take(STREAM_LEN);
                let mut sink = ThrottledSink::per_call(*write_limit);
                black_box(pump.run(&mut source, &mut sink).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pull_push, bench_event_loop);
criterion_main!(benches);
