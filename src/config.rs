//! Konfigurasi proses dari argumen command line

use clap::{Parser, ValueEnum};

use crate::core::{OverflowPolicy, MIN_CAPACITY};

/// Copy stdin ke stdout lewat ring buffer berkapasitas tetap
#[derive(Parser, Debug)]
#[command(name = "ringpipe", author, version, about, long_about = None)]
pub struct Args {
    /// Buffer size in bytes (values below 2 are raised to 2)
    pub capacity: usize,

    /// What to do when input arrives faster than output drains
    #[arg(long, value_enum, default_value_t = Overflow::Backpressure)]
    pub overflow: Overflow,

    /// Log filter for diagnostics on stderr (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Overflow {
    /// Stop reading while the buffer is full
    Backpressure,
    /// Keep reading and discard the oldest buffered bytes
    DropOldest,
}

impl From<Overflow> for OverflowPolicy {
    fn from(overflow: Overflow) -> Self {
        match overflow {
            Overflow::Backpressure => OverflowPolicy::Backpressure,
            Overflow::DropOldest => OverflowPolicy::DropOldest,
        }
    }
}

/// Konfigurasi pipe yang sudah divalidasi
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipeConfig {
    pub capacity: usize,
    pub overflow: OverflowPolicy,
}

impl Args {
    pub fn config(&self) -> PipeConfig {
        PipeConfig {
            capacity: self.capacity.max(MIN_CAPACITY),
            overflow: self.overflow.into(),
        }
    }
}
