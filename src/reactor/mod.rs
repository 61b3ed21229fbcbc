//! Reactor: readiness-driven event loop
//!
//! Menggunakan mio untuk menunggu source readable / sink writable.
//!
//! Fitur:
//! - Interest set dihitung ulang setiap iterasi dari state buffer
//! - Backpressure: read di-pause selama buffer penuh
//! - Fd yang tidak bisa di-poll (file biasa) dianggap selalu siap

mod event_loop;
mod interest;
mod poller;

pub use event_loop::{EventLoop, RunSummary};
pub use interest::{Endpoint, EndpointSet};
pub use poller::{MioReadiness, Readiness};
