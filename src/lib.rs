//! ringpipe - Bounded Non-Blocking Pipe Buffer
//!
//! Arsitektur:
//! - Fixed Memory: satu ring buffer berkapasitas tetap
//! - Non-Blocking: stdin/stdout dalam mode O_NONBLOCK
//! - Single-Threaded: satu event loop, satu titik suspend (readiness wait)

#[cfg(not(unix))]
compile_error!("ringpipe requires a unix platform");

pub mod config;
pub mod core;
pub mod error;
pub mod reactor;
pub mod stdio;
pub mod test_utils;

pub use error::{PipeError, Result};
