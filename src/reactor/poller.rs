//! Readiness backend berbasis mio
//!
//! Registrasi mengikuti interest set setiap iterasi: endpoint yang masuk
//! di-register, yang tetap diminati di-reregister, yang keluar di-deregister.
//! Reregister pada epoll edge-triggered melaporkan ulang readiness saat ini,
//! jadi loop mendapat semantik level-triggered seperti `select`.

use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

use mio::unix::SourceFd;
use mio::{Events, Poll, Registry};
use tracing::{debug, trace};

use super::interest::{Endpoint, EndpointSet};

const EVENTS_CAPACITY: usize = 8;

/// Satu-satunya titik suspend dari pipe.
pub trait Readiness {
    /// Blokir sampai minimal satu endpoint di `interests` siap, tanpa timeout.
    ///
    /// Hasil selalu subset dari `interests`; set kosong berarti wakeup
    /// tanpa endpoint yang siap.
    fn wait(&mut self, interests: EndpointSet) -> io::Result<EndpointSet>;
}

impl<T: Readiness + ?Sized> Readiness for &mut T {
    fn wait(&mut self, interests: EndpointSet) -> io::Result<EndpointSet> {
        (**self).wait(interests)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RegState {
    Idle,
    Registered,
    /// epoll menolak fd ini (EPERM: file biasa, /dev/null). Dianggap selalu
    /// siap karena operasinya memang tidak pernah would-block.
    AlwaysReady,
}

struct Registration {
    endpoint: Endpoint,
    fd: RawFd,
    state: RegState,
}

impl Registration {
    fn new(endpoint: Endpoint, fd: RawFd) -> Self {
        Self {
            endpoint,
            fd,
            state: RegState::Idle,
        }
    }

    fn sync(&mut self, registry: &Registry, wanted: bool) -> io::Result<()> {
        let token = self.endpoint.token();
        let interest = self.endpoint.interest();

        match (self.state, wanted) {
            (RegState::Idle, true) => {
                match registry.register(&mut SourceFd(&self.fd), token, interest) {
                    Ok(()) => self.state = RegState::Registered,
                    Err(e) if e.raw_os_error() == Some(libc::EPERM) => {
                        debug!(endpoint = ?self.endpoint, fd = self.fd, "fd not pollable, treating as always ready");
                        self.state = RegState::AlwaysReady;
                    }
                    Err(e) => return Err(e),
                }
            }
            (RegState::Registered, true) => {
                registry.reregister(&mut SourceFd(&self.fd), token, interest)?;
            }
            (RegState::Registered, false) => {
                registry.deregister(&mut SourceFd(&self.fd))?;
                self.state = RegState::Idle;
            }
            _ => {}
        }
        Ok(())
    }
}

/// [`Readiness`] di atas `mio::Poll` untuk dua raw fd.
///
/// Fd tidak dimiliki; caller menjamin keduanya tetap terbuka selama
/// `MioReadiness` hidup.
pub struct MioReadiness {
    poll: Poll,
    events: Events,
    source: Registration,
    sink: Registration,
}

impl MioReadiness {
    pub fn new(source_fd: RawFd, sink_fd: RawFd) -> io::Result<Self> {
        Ok(Self {
            poll: Poll::new()?,
            events: Events::with_capacity(EVENTS_CAPACITY),
            source: Registration::new(Endpoint::Source, source_fd),
            sink: Registration::new(Endpoint::Sink, sink_fd),
        })
    }
}

impl Readiness for MioReadiness {
    fn wait(&mut self, interests: EndpointSet) -> io::Result<EndpointSet> {
        let registry = self.poll.registry();
        self.source
            .sync(registry, interests.contains(Endpoint::Source))?;
        self.sink.sync(registry, interests.contains(Endpoint::Sink))?;

        let mut ready = EndpointSet::empty();
        let mut pollable = false;
        for reg in [&self.source, &self.sink] {
            match reg.state {
                RegState::AlwaysReady if interests.contains(reg.endpoint) => {
                    ready.insert(reg.endpoint)
                }
                RegState::Registered => pollable = true,
                _ => {}
            }
        }

        if !pollable {
            return Ok(ready);
        }

        // Jangan blokir jika sudah ada endpoint yang pasti siap
        let timeout = if ready.is_empty() {
            None
        } else {
            Some(Duration::ZERO)
        };

        loop {
            match self.poll.poll(&mut self.events, timeout) {
                Ok(()) => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        for event in self.events.iter() {
            if let Some(endpoint) = Endpoint::from_token(event.token()) {
                if interests.contains(endpoint) {
                    ready.insert(endpoint);
                }
            }
        }

        trace!(?interests, ?ready, "readiness wait returned");
        Ok(ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::os::unix::io::AsRawFd;
    use std::os::unix::net::UnixStream;

    #[test]
    fn test_writable_sink_reported_repeatedly() {
        let (a, b) = UnixStream::pair().unwrap();
        let mut readiness = MioReadiness::new(a.as_raw_fd(), b.as_raw_fd()).unwrap();
        let sink_only = EndpointSet::of(&[Endpoint::Sink]);

        // Reregister melaporkan ulang level, jadi wait kedua tidak blokir
        assert_eq!(readiness.wait(sink_only).unwrap(), sink_only);
        assert_eq!(readiness.wait(sink_only).unwrap(), sink_only);
    }

    #[test]
    fn test_readable_source_after_peer_write() {
        let (a, mut b) = UnixStream::pair().unwrap();
        let mut readiness = MioReadiness::new(a.as_raw_fd(), b.as_raw_fd()).unwrap();

        b.write_all(b"ping").unwrap();
        let source_only = EndpointSet::of(&[Endpoint::Source]);
        assert_eq!(readiness.wait(source_only).unwrap(), source_only);
    }

    #[test]
    fn test_dropped_interest_is_not_reported() {
        let (a, mut b) = UnixStream::pair().unwrap();
        let mut readiness = MioReadiness::new(a.as_raw_fd(), b.as_raw_fd()).unwrap();
        b.write_all(b"ping").unwrap();

        let both = EndpointSet::of(&Endpoint::ALL);
        let ready = readiness.wait(both).unwrap();
        assert!(ready.contains(Endpoint::Sink));

        let sink_only = EndpointSet::of(&[Endpoint::Sink]);
        assert_eq!(readiness.wait(sink_only).unwrap(), sink_only);
    }

    #[test]
    fn test_regular_file_is_always_ready() {
        let file = File::open(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml")).unwrap();
        let (_a, b) = UnixStream::pair().unwrap();
        let mut readiness = MioReadiness::new(file.as_raw_fd(), b.as_raw_fd()).unwrap();

        let source_only = EndpointSet::of(&[Endpoint::Source]);
        assert_eq!(readiness.wait(source_only).unwrap(), source_only);

        let both = EndpointSet::of(&Endpoint::ALL);
        assert_eq!(readiness.wait(both).unwrap(), both);
    }

    #[test]
    fn test_empty_interest_returns_immediately() {
        let (a, b) = UnixStream::pair().unwrap();
        let mut readiness = MioReadiness::new(a.as_raw_fd(), b.as_raw_fd()).unwrap();

        assert!(readiness.wait(EndpointSet::empty()).unwrap().is_empty());
    }
}
