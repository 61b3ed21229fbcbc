//! Stream endpoints di atas raw fd
//!
//! `Stdin`/`Stdout` milik std memakai buffer userspace, yang menyembunyikan
//! byte dari readiness notification. `FdStream` langsung memanggil
//! `read(2)`/`write(2)`.

use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};

use tracing::{debug, warn};

#[inline]
fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

#[inline]
fn cvt_size(ret: libc::ssize_t) -> io::Result<usize> {
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret as usize)
    }
}

fn get_flags(fd: RawFd) -> io::Result<libc::c_int> {
    // SAFETY: F_GETFL tidak menyentuh memori; fd invalid hanya menghasilkan EBADF
    cvt(unsafe { libc::fcntl(fd, libc::F_GETFL) })
}

fn set_flags(fd: RawFd, flags: libc::c_int) -> io::Result<()> {
    // SAFETY: sama seperti get_flags
    cvt(unsafe { libc::fcntl(fd, libc::F_SETFL, flags) }).map(|_| ())
}

/// Guard yang memasang `O_NONBLOCK` pada fd dan mengembalikan flag asli
/// saat di-drop.
#[derive(Debug)]
pub struct NonBlocking {
    fd: RawFd,
    original: libc::c_int,
}

impl NonBlocking {
    pub fn enable(fd: RawFd) -> io::Result<Self> {
        let original = get_flags(fd)?;
        if original & libc::O_NONBLOCK == 0 {
            set_flags(fd, original | libc::O_NONBLOCK)?;
        }
        debug!(fd, "non-blocking mode enabled");

        Ok(Self { fd, original })
    }

    pub fn fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for NonBlocking {
    fn drop(&mut self) {
        if let Err(e) = set_flags(self.fd, self.original) {
            warn!(fd = self.fd, error = %e, "failed to restore fd flags");
        }
    }
}

/// Tanpa buffer `Read`/`Write` di atas fd pinjaman. Fd tidak ditutup saat drop.
#[derive(Debug, Clone, Copy)]
pub struct FdStream {
    fd: RawFd,
}

impl FdStream {
    /// Caller menjamin `fd` tetap terbuka selama stream dipakai.
    pub fn borrow_raw(fd: RawFd) -> Self {
        Self { fd }
    }

    pub fn stdin() -> Self {
        Self::borrow_raw(libc::STDIN_FILENO)
    }

    pub fn stdout() -> Self {
        Self::borrow_raw(libc::STDOUT_FILENO)
    }
}

impl AsRawFd for FdStream {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Read for FdStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: buf valid untuk buf.len() byte selama panggilan
        cvt_size(unsafe { libc::read(self.fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) })
    }
}

impl Write for FdStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // SAFETY: buf valid untuk buf.len() byte selama panggilan
        cvt_size(unsafe { libc::write(self.fd, buf.as_ptr() as *const libc::c_void, buf.len()) })
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
