//! Property tests untuk RingBuffer dan EventLoop.
//!
//! Dengan backpressure, output harus identik dengan input untuk semua
//! kapasitas, pola chunk read, batas write, dan urutan readiness.

use std::collections::VecDeque;

use proptest::prelude::*;
use ringpipe::core::{OverflowPolicy, RingBuffer};
use ringpipe::reactor::{Endpoint, EndpointSet, EventLoop};
use ringpipe::test_utils::{
    init_test_logging, ReadStep, ScriptedReadiness, ScriptedSource, ThrottledSink,
};

fn arb_ready_set() -> impl Strategy<Value = EndpointSet> {
    (any::<bool>(), any::<bool>()).prop_map(|(source, sink)| {
        let mut set = EndpointSet::empty();
        set.set(Endpoint::Source, source);
        set.set(Endpoint::Sink, sink);
        set
    })
}

/// Potong input jadi langkah read, kadang diselingi would-block.
fn read_steps(input: &[u8], chunk: usize, stalls: &[bool]) -> Vec<ReadStep> {
    let mut steps = Vec::new();
    for (i, piece) in input.chunks(chunk.max(1)).enumerate() {
        if stalls.get(i).copied().unwrap_or(false) {
            steps.push(ReadStep::WouldBlock);
        }
        steps.push(ReadStep::data(piece));
    }
    steps.push(ReadStep::Eof);
    steps
}

#[derive(Clone, Debug)]
enum Op {
    Pull(Vec<u8>),
    Push(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 1..24).prop_map(Op::Pull),
        (0usize..24).prop_map(Op::Push),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Output == input, urutan terjaga, tidak ada byte yang dibuang.
    #[test]
    fn pipe_preserves_bytes_under_backpressure(
        capacity in 0usize..48,
        input in prop::collection::vec(any::<u8>(), 0..600),
        chunk in 1usize..40,
        write_limit in 1usize..40,
        stalls in prop::collection::vec(any::<bool>(), 0..64),
        readiness in prop::collection::vec(arb_ready_set(), 0..64),
    ) {
        init_test_logging();
        let ring = RingBuffer::new(capacity);
        let usable = ring.usable_capacity();
        let readiness = ScriptedReadiness::sequence(readiness).with_max_waits(100_000);
        let mut pump = EventLoop::new(readiness, ring);
        let mut source = ScriptedSource::new(read_steps(&input, chunk, &stalls));
        let mut sink = ThrottledSink::per_call(write_limit);

        while !pump.is_complete() {
            pump.step(&mut source, &mut sink).unwrap();
            prop_assert!(pump.ring().len() <= usable);
        }

        prop_assert_eq!(sink.output(), &input[..]);
        prop_assert_eq!(pump.summary().stats.bytes_dropped, 0);
        prop_assert!(pump.ring().is_empty());
    }

    /// Pull/push acak dibandingkan dengan model VecDeque.
    #[test]
    fn ring_matches_queue_model(
        capacity in 2usize..32,
        ops in prop::collection::vec(arb_op(), 0..80),
    ) {
        let mut ring = RingBuffer::new(capacity);
        let mut model: VecDeque<u8> = VecDeque::new();
        let mut expected = Vec::new();
        let mut actual = Vec::new();

        for op in ops {
            match op {
                Op::Pull(bytes) => {
                    let mut source = ScriptedSource::new([ReadStep::Data(bytes.clone())]);
                    ring.pull(&mut source);
                    let stored = ring.len() - model.len();
                    model.extend(&bytes[..stored]);
                }
                Op::Push(limit) => {
                    let mut limited = ThrottledSink::with_limits([limit, limit]);
                    let n = ring.push(&mut limited).unwrap();
                    prop_assert_eq!(limited.output().len(), n);
                    for _ in 0..n {
                        expected.push(model.pop_front().unwrap());
                    }
                    actual.extend_from_slice(limited.output());
                }
            }
            prop_assert_eq!(ring.len(), model.len());
            prop_assert_eq!(ring.is_empty(), model.is_empty());
            prop_assert!(ring.len() <= ring.usable_capacity());
        }

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(ring.stats().bytes_dropped, 0);
    }

    /// DropOldest: output selalu berupa subsequence berurutan dari input,
    /// dan byte terakhir yang dibaca tidak pernah hilang.
    #[test]
    fn drop_oldest_keeps_order_and_newest_bytes(
        capacity in 2usize..16,
        input in prop::collection::vec(any::<u8>(), 1..200),
        chunk in 1usize..40,
    ) {
        let ring = RingBuffer::with_policy(capacity, OverflowPolicy::DropOldest);
        let usable = ring.usable_capacity();
        // Source dulu sampai EOF, baru sink
        let source_first = vec![EndpointSet::of(&[Endpoint::Source]); input.len() + 1];
        let readiness = ScriptedReadiness::sequence(source_first).with_max_waits(100_000);
        let mut pump = EventLoop::new(readiness, ring);
        let mut source = ScriptedSource::new(read_steps(&input, chunk, &[]));
        let mut sink = ThrottledSink::unlimited();

        let summary = pump.run(&mut source, &mut sink).unwrap();
        let output = sink.output();

        let kept = input.len().min(usable);
        prop_assert_eq!(output, &input[input.len() - kept..]);
        prop_assert_eq!(summary.stats.bytes_dropped as usize, input.len() - kept);
    }
}
