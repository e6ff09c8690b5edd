//! POSIX-style error codes for the terminal layer
//!
//! Every fallible operation in this crate returns `Result<_, Errno>`.
//! The numeric values follow the Linux errno table so that callers
//! sitting behind a syscall boundary can return `-errno` directly.

use core::fmt;

/// Errors surfaced by the terminal subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    /// Wait interrupted by a signal (EINTR)
    Interrupted,
    /// Operation would block and non-blocking mode was requested (EAGAIN)
    WouldBlock,
    /// Queue allocation failed (ENOMEM)
    OutOfMemory,
    /// Bad user-space address in an ioctl argument (EFAULT)
    BadAddress,
    /// Exclusive open of an already-open terminal (EBUSY)
    Busy,
    /// No terminal registered under the requested minor (ENODEV)
    NoSuchDevice,
    /// Unknown ioctl command with no backend fallback (EINVAL)
    InvalidArgument,
    /// Seek on a terminal device (ESPIPE)
    IllegalSeek,
}

impl Errno {
    /// The Linux errno value.
    pub fn code(self) -> i32 {
        match self {
            Errno::Interrupted => 4,
            Errno::WouldBlock => 11,
            Errno::OutOfMemory => 12,
            Errno::BadAddress => 14,
            Errno::Busy => 16,
            Errno::NoSuchDevice => 19,
            Errno::InvalidArgument => 22,
            Errno::IllegalSeek => 29,
        }
    }

    /// Negated errno, the form syscall dispatch returns to user space.
    pub fn as_neg(self) -> i32 {
        -self.code()
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Errno::Interrupted => "interrupted",
            Errno::WouldBlock => "would block",
            Errno::OutOfMemory => "out of memory",
            Errno::BadAddress => "bad address",
            Errno::Busy => "device busy",
            Errno::NoSuchDevice => "no such device",
            Errno::InvalidArgument => "invalid argument",
            Errno::IllegalSeek => "illegal seek",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_linux_errno_table() {
        assert_eq!(Errno::Interrupted.code(), 4);
        assert_eq!(Errno::WouldBlock.code(), 11);
        assert_eq!(Errno::OutOfMemory.code(), 12);
        assert_eq!(Errno::BadAddress.code(), 14);
        assert_eq!(Errno::Busy.code(), 16);
        assert_eq!(Errno::NoSuchDevice.code(), 19);
        assert_eq!(Errno::InvalidArgument.code(), 22);
        assert_eq!(Errno::IllegalSeek.code(), 29);
    }

    #[test]
    fn neg_form_is_negative() {
        assert_eq!(Errno::WouldBlock.as_neg(), -11);
        assert_eq!(Errno::NoSuchDevice.as_neg(), -19);
    }
}
