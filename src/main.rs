//! ringpipe - copy stdin ke stdout lewat ring buffer berkapasitas tetap
//!
//! Usage:
//!   producer | ringpipe <buffer size in bytes> | consumer

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use ringpipe::config::{Args, PipeConfig};
use ringpipe::core::RingBuffer;
use ringpipe::reactor::{EventLoop, MioReadiness, RunSummary};
use ringpipe::stdio::{FdStream, NonBlocking};
use ringpipe::PipeError;

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: PipeConfig) -> ringpipe::Result<RunSummary> {
    let mut source = FdStream::stdin();
    let mut sink = FdStream::stdout();

    // Flag asli dikembalikan saat guard di-drop
    let _source_mode = NonBlocking::enable(libc::STDIN_FILENO).map_err(PipeError::Setup)?;
    let _sink_mode = NonBlocking::enable(libc::STDOUT_FILENO).map_err(PipeError::Setup)?;

    let readiness = MioReadiness::new(libc::STDIN_FILENO, libc::STDOUT_FILENO)
        .map_err(PipeError::Setup)?;

    info!(capacity = config.capacity, "allocating buffer");
    let ring = RingBuffer::with_policy(config.capacity, config.overflow);

    EventLoop::new(readiness, ring).run(&mut source, &mut sink)
}

fn main() -> ExitCode {
    // Usage error: clap keluar dengan status 2 sebelum loop dimulai
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args.config()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "pipe aborted");
            ExitCode::FAILURE
        }
    }
}
