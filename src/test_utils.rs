//! Scripted endpoints untuk test dan benchmark.
//!
//! - [`ScriptedSource`]: `Read` yang mengikuti daftar langkah
//! - [`ThrottledSink`]: `Write` dengan batas byte per panggilan
//! - [`ScriptedReadiness`]: backend readiness tanpa syscall

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::Once;

use crate::reactor::{EndpointSet, Readiness};

static INIT_LOGGING: Once = Once::new();

/// Inisialisasi logging untuk test (sekali per proses).
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ringpipe=trace")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Satu langkah read dari [`ScriptedSource`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadStep {
    /// Byte yang tersedia; sisa yang tidak muat dikirim di read berikutnya
    Data(Vec<u8>),
    WouldBlock,
    Interrupted,
    Eof,
    Fail,
}

impl ReadStep {
    pub fn data(bytes: &[u8]) -> Self {
        ReadStep::Data(bytes.to_vec())
    }
}

/// Source yang memutar ulang skrip. Setelah skrip habis selalu would-block.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    steps: VecDeque<ReadStep>,
    reads: usize,
}

impl ScriptedSource {
    pub fn new<I: IntoIterator<Item = ReadStep>>(steps: I) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            reads: 0,
        }
    }

    /// Kirim `input` dalam potongan `chunk` byte, diakhiri EOF.
    pub fn chunked(input: &[u8], chunk: usize) -> Self {
        let chunk = chunk.max(1);
        let mut steps: Vec<ReadStep> = input.chunks(chunk).map(ReadStep::data).collect();
        steps.push(ReadStep::Eof);
        Self::new(steps)
    }

    /// Jumlah panggilan `read`
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn is_exhausted(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Read for ScriptedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;

        match self.steps.pop_front() {
            None | Some(ReadStep::WouldBlock) => Err(io::ErrorKind::WouldBlock.into()),
            Some(ReadStep::Interrupted) => Err(io::ErrorKind::Interrupted.into()),
            Some(ReadStep::Eof) => {
                // EOF bersifat permanen
                self.steps.push_front(ReadStep::Eof);
                Ok(0)
            }
            Some(ReadStep::Fail) => Err(io::Error::new(io::ErrorKind::Other, "scripted read failure")),
            Some(ReadStep::Data(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    bytes.drain(..n);
                    self.steps.push_front(ReadStep::Data(bytes));
                }
                Ok(n)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WriteStep {
    Accept(usize),
    WouldBlock,
    Fail,
}

/// Sink yang menerima paling banyak N byte per panggilan `write`.
#[derive(Debug)]
pub struct ThrottledSink {
    steps: VecDeque<WriteStep>,
    fallback: WriteStep,
    output: Vec<u8>,
    chunks: Vec<Vec<u8>>,
    writes: usize,
}

impl ThrottledSink {
    fn with_fallback(fallback: WriteStep) -> Self {
        Self {
            steps: VecDeque::new(),
            fallback,
            output: Vec::new(),
            chunks: Vec::new(),
            writes: 0,
        }
    }

    /// Terima semua byte di setiap panggilan
    pub fn unlimited() -> Self {
        Self::with_fallback(WriteStep::Accept(usize::MAX))
    }

    /// Terima `per_call` byte setiap panggilan
    pub fn per_call(per_call: usize) -> Self {
        Self::with_fallback(WriteStep::Accept(per_call))
    }

    /// Ikuti batas per panggilan, lalu would-block
    pub fn with_limits<I: IntoIterator<Item = usize>>(limits: I) -> Self {
        let mut sink = Self::with_fallback(WriteStep::WouldBlock);
        sink.steps = limits.into_iter().map(WriteStep::Accept).collect();
        sink
    }

    /// Selalu would-block
    pub fn blocked() -> Self {
        Self::with_fallback(WriteStep::WouldBlock)
    }

    /// Selalu broken pipe
    pub fn broken() -> Self {
        Self::with_fallback(WriteStep::Fail)
    }

    /// Sisipkan would-block sebelum panggilan berikutnya
    pub fn stall_once(&mut self) {
        self.steps.push_front(WriteStep::WouldBlock);
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Isi setiap write yang berhasil, sesuai urutan
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    /// Jumlah panggilan `write`, termasuk yang would-block
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Write for ThrottledSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;

        match self.steps.pop_front().unwrap_or(self.fallback) {
            WriteStep::WouldBlock => Err(io::ErrorKind::WouldBlock.into()),
            WriteStep::Fail => Err(io::ErrorKind::BrokenPipe.into()),
            WriteStep::Accept(limit) => {
                let n = limit.min(buf.len());
                if n > 0 {
                    self.output.extend_from_slice(&buf[..n]);
                    self.chunks.push(buf[..n].to_vec());
                }
                Ok(n)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Backend readiness untuk test: tiap `wait` mengembalikan langkah skrip
/// berikutnya (dipotong ke interest), atau semua interest setelah skrip habis.
#[derive(Debug, Default)]
pub struct ScriptedReadiness {
    steps: VecDeque<EndpointSet>,
    history: Vec<EndpointSet>,
    max_waits: Option<usize>,
}

impl ScriptedReadiness {
    /// Semua endpoint yang diminati selalu siap
    pub fn always() -> Self {
        Self::default()
    }

    pub fn sequence<I: IntoIterator<Item = EndpointSet>>(steps: I) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Gagalkan `wait` setelah `limit` panggilan, untuk skenario yang
    /// sengaja tidak pernah selesai.
    pub fn with_max_waits(mut self, limit: usize) -> Self {
        self.max_waits = Some(limit);
        self
    }

    /// Interest set di setiap panggilan `wait`
    pub fn history(&self) -> &[EndpointSet] {
        &self.history
    }
}

impl Readiness for ScriptedReadiness {
    fn wait(&mut self, interests: EndpointSet) -> io::Result<EndpointSet> {
        if let Some(limit) = self.max_waits {
            if self.history.len() >= limit {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "wait limit reached"));
            }
        }
        self.history.push(interests);

        let ready = self.steps.pop_front().unwrap_or(interests);
        Ok(ready.intersect(interests))
    }
}
