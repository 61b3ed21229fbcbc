use std::io;

use thiserror::Error;

/// Error yang menghentikan pipe. Would-block, interrupted, dan hard read
/// error tidak pernah sampai ke sini.
#[derive(Error, Debug)]
pub enum PipeError {
    #[error("failed to prepare stream endpoints: {0}")]
    Setup(#[source] io::Error),

    #[error("readiness wait failed: {0}")]
    Poll(#[source] io::Error),

    #[error("write to sink failed: {0}")]
    Write(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, PipeError>;
