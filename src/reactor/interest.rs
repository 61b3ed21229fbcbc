//! Endpoint registration set
//!
//! Pengganti bitmask readiness: himpunan kecil endpoint yang dihitung ulang
//! setiap iterasi loop dari state, bukan di-toggle bit per bit.

use std::fmt;

use mio::{Interest, Token};

/// Satu dari dua endpoint pipe. Source selalu read-interest, sink selalu
/// write-interest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Source,
    Sink,
}

impl Endpoint {
    pub const ALL: [Endpoint; 2] = [Endpoint::Source, Endpoint::Sink];

    #[inline]
    pub fn token(self) -> Token {
        match self {
            Endpoint::Source => Token(0),
            Endpoint::Sink => Token(1),
        }
    }

    #[inline]
    pub fn from_token(token: Token) -> Option<Self> {
        match token {
            Token(0) => Some(Endpoint::Source),
            Token(1) => Some(Endpoint::Sink),
            _ => None,
        }
    }

    /// Jenis readiness yang ditunggu untuk endpoint ini
    #[inline]
    pub fn interest(self) -> Interest {
        match self {
            Endpoint::Source => Interest::READABLE,
            Endpoint::Sink => Interest::WRITABLE,
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        match self {
            Endpoint::Source => 0b01,
            Endpoint::Sink => 0b10,
        }
    }
}

/// Himpunan endpoint: dipakai untuk interest maupun hasil readiness.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointSet(u8);

impl EndpointSet {
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub fn of(endpoints: &[Endpoint]) -> Self {
        let mut set = Self::empty();
        for &endpoint in endpoints {
            set.insert(endpoint);
        }
        set
    }

    #[inline]
    pub fn insert(&mut self, endpoint: Endpoint) {
        self.0 |= endpoint.bit();
    }

    #[inline]
    pub fn set(&mut self, endpoint: Endpoint, present: bool) {
        if present {
            self.0 |= endpoint.bit();
        } else {
            self.0 &= !endpoint.bit();
        }
    }

    #[inline]
    pub fn contains(self, endpoint: Endpoint) -> bool {
        self.0 & endpoint.bit() != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn intersect(self, other: EndpointSet) -> EndpointSet {
        EndpointSet(self.0 & other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Endpoint> {
        Endpoint::ALL.into_iter().filter(move |e| self.contains(*e))
    }
}

impl fmt::Debug for EndpointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
