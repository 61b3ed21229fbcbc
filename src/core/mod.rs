//! Core module: Byte Ring Buffer dengan cursor wraparound
//!
//! Prinsip desain:
//! - Fixed-Capacity: storage dialokasikan sekali, tidak pernah di-resize
//! - Non-Blocking: pull/push tidak pernah menunggu endpoint
//! - Exact Ordering: byte keluar sesuai urutan masuk (kecuali DropOldest)

mod ring_buffer;

pub use ring_buffer::{advance, OverflowPolicy, PullOutcome, RingBuffer, RingStats, MIN_CAPACITY};
