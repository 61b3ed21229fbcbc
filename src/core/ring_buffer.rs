//! Byte Ring Buffer dengan kapasitas tetap
//!
//! Buffer antara source dan sink yang siap pada waktu berbeda.
//! Satu slot selalu dicadangkan sehingga `head == tail` hanya berarti kosong,
//! jadi kapasitas efektif adalah `C - 1`. Tidak ada alokasi setelah init.
//!
//! Semua pergeseran cursor lewat [`advance`].

use std::io::{self, Read, Write};

/// Kapasitas minimum; permintaan lebih kecil di-clamp ke nilai ini.
pub const MIN_CAPACITY: usize = 2;

/// Geser index sebanyak `by` dengan wraparound modulo `capacity`.
#[inline(always)]
pub fn advance(index: usize, by: usize, capacity: usize) -> usize {
    (index + by) % capacity
}

/// Apa yang terjadi ketika source membawa lebih banyak byte dari ruang kosong.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Baca hanya ke slot yang benar-benar kosong. Tidak ada byte yang hilang.
    #[default]
    Backpressure,
    /// Selalu baca ke `[head, C)` dan geser `tail` ke depan saat tertimpa.
    /// Buffer menyimpan byte paling baru.
    DropOldest,
}

/// Hasil satu pemanggilan [`RingBuffer::pull`].
#[derive(Debug)]
pub enum PullOutcome {
    /// Sejumlah byte tersimpan dan source sedang kosong.
    Progress(usize),
    /// Source would-block (atau interrupted) sebelum ada byte tersimpan.
    NoProgress,
    /// Buffer penuh; source mungkin masih punya byte.
    Full(usize),
    /// Source sudah habis, tidak akan ada byte lagi.
    EndOfInput,
    /// Error I/O selain would-block/interrupted.
    HardError(io::Error),
}

impl PullOutcome {
    /// `true` jika source tidak boleh dibaca lagi.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PullOutcome::EndOfInput | PullOutcome::HardError(_))
    }
}

/// Counter transfer untuk diagnostik
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RingStats {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub bytes_dropped: u64,
}

/// Fixed-capacity byte ring
///
/// `head` adalah slot berikutnya untuk pull, `tail` adalah byte tertua yang
/// belum di-push.
pub struct RingBuffer {
    storage: Box<[u8]>,
    head: usize,
    tail: usize,
    policy: OverflowPolicy,
    stats: RingStats,
}

impl RingBuffer {
    /// Membuat ring buffer dengan policy default (backpressure).
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, OverflowPolicy::default())
    }

    /// Membuat ring buffer. `capacity < 2` di-clamp ke [`MIN_CAPACITY`].
    pub fn with_policy(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);

        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            policy,
            stats: RingStats::default(),
        }
    }

    /// Tarik byte dari source non-blocking sampai source kosong, habis,
    /// atau buffer penuh.
    ///
    /// Would-block dan interrupted tidak pernah keluar sebagai error.
    pub fn pull<R: Read + ?Sized>(&mut self, source: &mut R) -> PullOutcome {
        let capacity = self.capacity();
        let mut stored = 0;

        loop {
            let start = self.head;
            let end = self.region_end();
            if end == start {
                return PullOutcome::Full(stored);
            }

            let wanted = end - start;
            let len_before = self.len();

            let n = match source.read(&mut self.storage[start..end]) {
                Ok(0) => return PullOutcome::EndOfInput,
                Ok(n) => n,
                Err(ref e) if is_transient(e) => {
                    return if stored == 0 {
                        PullOutcome::NoProgress
                    } else {
                        PullOutcome::Progress(stored)
                    };
                }
                Err(e) => return PullOutcome::HardError(e),
            };

            stored += n;
            self.stats.bytes_in += n as u64;

            let tail_ahead = self.tail > start;
            self.head = advance(start, n, capacity);

            if self.policy == OverflowPolicy::DropOldest {
                if n == wanted {
                    // [start, C) penuh dan head wrap ke 0
                    if self.tail == 0 || tail_ahead {
                        self.tail = 1;
                    }
                } else if tail_ahead && self.head >= self.tail {
                    self.tail = advance(self.head, 1, capacity);
                }
                self.stats.bytes_dropped += (len_before + n - self.len()) as u64;
            }

            if n < wanted {
                return PullOutcome::Progress(stored);
            }
            if self.head != 0 {
                // Terisi sampai slot cadangan
                return PullOutcome::Full(stored);
            }
        }
    }

    /// Dorong byte ke sink non-blocking. Satu write per run yang kontigu,
    /// bukan drain loop.
    ///
    /// Returns total byte yang ditulis; `0` berarti sink would-block.
    pub fn push<W: Write + ?Sized>(&mut self, sink: &mut W) -> io::Result<usize> {
        let capacity = self.capacity();

        if self.tail < self.head {
            let n = write_some(sink, &self.storage[self.tail..self.head])?;
            self.tail = advance(self.tail, n, capacity);
            self.stats.bytes_out += n as u64;
            return Ok(n);
        }

        if self.head < self.tail {
            let run = capacity - self.tail;
            let n = write_some(sink, &self.storage[self.tail..])?;
            self.stats.bytes_out += n as u64;

            if n < run {
                // Wrap ditunda ke panggilan berikutnya
                self.tail = advance(self.tail, n, capacity);
                return Ok(n);
            }

            self.tail = 0;
            let m = if self.head > 0 {
                write_some(sink, &self.storage[..self.head])?
            } else {
                0
            };
            self.tail = m;
            self.stats.bytes_out += m as u64;
            return Ok(n + m);
        }

        Ok(0)
    }

    /// Cek apakah buffer kosong
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Cek apakah buffer penuh (hanya slot cadangan yang tersisa)
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        advance(self.head, 1, self.capacity()) == self.tail
    }

    /// Jumlah byte yang belum di-push
    #[inline(always)]
    pub fn len(&self) -> usize {
        let capacity = self.capacity();
        (self.head + capacity - self.tail) % capacity
    }

    /// Kapasitas storage, termasuk slot cadangan
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Byte maksimum yang bisa ditahan sekaligus
    #[inline(always)]
    pub fn usable_capacity(&self) -> usize {
        self.capacity() - 1
    }

    #[inline(always)]
    pub fn head(&self) -> usize {
        self.head
    }

    #[inline(always)]
    pub fn tail(&self) -> usize {
        self.tail
    }

    #[inline(always)]
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    #[inline(always)]
    pub fn stats(&self) -> RingStats {
        self.stats
    }

    /// Akhir (eksklusif) region kontigu mulai dari `head` yang boleh diisi pull.
    fn region_end(&self) -> usize {
        let capacity = self.capacity();
        match self.policy {
            OverflowPolicy::DropOldest => capacity,
            OverflowPolicy::Backpressure => {
                if self.tail > self.head {
                    self.tail - 1
                } else if self.tail == 0 {
                    capacity - 1
                } else {
                    capacity
                }
            }
        }
    }
}

#[inline]
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

fn write_some<W: Write + ?Sized>(sink: &mut W, buf: &[u8]) -> io::Result<usize> {
    match sink.write(buf) {
        Ok(n) => Ok(n),
        Err(ref e) if is_transient(e) => Ok(0),
        Err(e) => Err(e),
    }
}
