//! Event loop yang menggerakkan RingBuffer
//!
//! State: `done_reading` dan interest set. Setiap siklus:
//! wait -> pull jika source siap -> push jika sink siap -> hitung ulang interest.
//! Selesai ketika source habis dan buffer kosong.

use std::io::{Read, Write};

use tracing::{debug, error, info, trace, warn};

use super::interest::{Endpoint, EndpointSet};
use super::poller::Readiness;
use crate::core::{OverflowPolicy, PullOutcome, RingBuffer, RingStats};
use crate::error::{PipeError, Result};

/// Ringkasan satu run yang selesai
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u64,
    pub stats: RingStats,
}

/// Pump single-threaded dari source ke sink lewat satu RingBuffer.
pub struct EventLoop<P: Readiness> {
    readiness: P,
    ring: RingBuffer,
    done_reading: bool,
    interests: EndpointSet,
    iterations: u64,
}

impl<P: Readiness> EventLoop<P> {
    /// Buffer mulai kosong: hanya read interest yang aktif.
    pub fn new(readiness: P, ring: RingBuffer) -> Self {
        Self {
            readiness,
            ring,
            done_reading: false,
            interests: EndpointSet::of(&[Endpoint::Source]),
            iterations: 0,
        }
    }

    /// Jalankan sampai source habis dan buffer kosong.
    ///
    /// Hanya error readiness dan hard write error yang menghentikan run.
    pub fn run<R, W>(&mut self, source: &mut R, sink: &mut W) -> Result<RunSummary>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        info!(
            capacity = self.ring.capacity(),
            policy = ?self.ring.policy(),
            "pipe started"
        );

        while !self.is_complete() {
            self.step(source, sink)?;
        }

        let summary = self.summary();
        info!(
            iterations = summary.iterations,
            bytes_in = summary.stats.bytes_in,
            bytes_out = summary.stats.bytes_out,
            bytes_dropped = summary.stats.bytes_dropped,
            "no more bytes to write"
        );
        Ok(summary)
    }

    /// Satu siklus wait/dispatch/recompute.
    pub fn step<R, W>(&mut self, source: &mut R, sink: &mut W) -> Result<()>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let ready = self
            .readiness
            .wait(self.interests)
            .map_err(PipeError::Poll)?;
        self.iterations += 1;

        if ready.contains(Endpoint::Source) {
            self.on_readable(source);
        }
        if ready.contains(Endpoint::Sink) {
            self.on_writable(sink)?;
        }

        self.recompute_interests();
        Ok(())
    }

    fn on_readable<R: Read + ?Sized>(&mut self, source: &mut R) {
        let dropped_before = self.ring.stats().bytes_dropped;

        match self.ring.pull(source) {
            PullOutcome::Progress(n) => trace!(n, len = self.ring.len(), "pulled"),
            PullOutcome::NoProgress => trace!("source would block"),
            PullOutcome::Full(n) => debug!(n, "buffer full"),
            PullOutcome::EndOfInput => {
                debug!(buffered = self.ring.len(), "no more bytes to read");
                self.done_reading = true;
            }
            PullOutcome::HardError(e) => {
                warn!(error = %e, "read failed, treating as end of input");
                self.done_reading = true;
            }
        }

        let dropped = self.ring.stats().bytes_dropped - dropped_before;
        if dropped > 0 {
            warn!(dropped, "buffer overflow, oldest bytes discarded");
        }
    }

    fn on_writable<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<()> {
        match self.ring.push(sink) {
            Ok(n) => {
                trace!(n, len = self.ring.len(), "pushed");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, buffered = self.ring.len(), "sink write failed");
                Err(PipeError::Write(e))
            }
        }
    }

    fn recompute_interests(&mut self) {
        let read_paused =
            self.ring.policy() == OverflowPolicy::Backpressure && self.ring.is_full();

        self.interests
            .set(Endpoint::Source, !self.done_reading && !read_paused);
        self.interests.set(Endpoint::Sink, !self.ring.is_empty());
    }

    /// `true` jika source habis dan buffer kosong
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.done_reading && self.ring.is_empty()
    }

    #[inline]
    pub fn is_done_reading(&self) -> bool {
        self.done_reading
    }

    /// Interest set untuk wait berikutnya
    #[inline]
    pub fn interests(&self) -> EndpointSet {
        self.interests
    }

    #[inline]
    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    #[inline]
    pub fn readiness(&self) -> &P {
        &self.readiness
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            iterations: self.iterations,
            stats: self.ring.stats(),
        }
    }
}
