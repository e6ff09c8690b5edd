//! Hardware backend capability interface
//!
//! Every terminal slot is bound at registration time to an operation
//! table describing its backend (direct console, BIOS console, serial
//! port, pseudo-terminal half). The line discipline drives the backend
//! only through this trait, so a new device kind is a new
//! implementation, not a new call site.

use bitflags::bitflags;

use crate::errno::Errno;
use crate::tty::Tty;

bitflags! {
    /// Open-mode bits the facade honors, Linux octal values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OpenFlags: u32 {
        /// Fail with `Busy` if the terminal is already open
        const EXCL = 0o200;
        /// Do not acquire the terminal as controlling terminal
        const NOCTTY = 0o400;
        /// Never block in read or write
        const NONBLOCK = 0o4000;
    }
}

/// Per-device operation table.
///
/// `pump_input` and `ioctl` are optional capabilities: the defaults
/// report "not provided" and the engine adapts (a backend without an
/// input pump is interrupt-driven; a backend without an ioctl rejects
/// unknown commands).
pub trait DeviceOps {
    /// Bring the hardware up for an open. Expected to allocate the
    /// terminal's queues (`Tty::alloc_queues`) sized for the device.
    fn open(&self, tty: &mut Tty) -> Result<(), Errno>;

    /// Shut the hardware down on the final release.
    fn release(&self, tty: &mut Tty);

    /// Poll the hardware for pending input, feeding `tty`'s input
    /// queue. Returns `true` if this backend is a polling device (the
    /// read engine then treats the call as non-blocking), `false` if
    /// input arrives asynchronously and there is nothing to poll.
    fn pump_input(&self, tty: &mut Tty) -> bool {
        let _ = tty;
        false
    }

    /// Drain the terminal's output queue towards the hardware. Invoked
    /// after every byte enqueued so devices without interrupt-driven
    /// transmit still make progress.
    fn pump_output(&self, tty: &mut Tty);

    /// Device-specific ioctl. `None` means the backend has no ioctl
    /// handler; `Some(result)` is passed through to the caller.
    fn ioctl(&self, tty: &mut Tty, cmd: u32, arg: u64) -> Option<Result<(), Errno>> {
        let _ = (tty, cmd, arg);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_flag_values_match_linux() {
        assert_eq!(OpenFlags::EXCL.bits(), 0o200);
        assert_eq!(OpenFlags::NOCTTY.bits(), 0o400);
        assert_eq!(OpenFlags::NONBLOCK.bits(), 0o4000);
    }

    struct Inert;

    impl DeviceOps for Inert {
        fn open(&self, _tty: &mut Tty) -> Result<(), Errno> {
            Ok(())
        }
        fn release(&self, _tty: &mut Tty) {}
        fn pump_output(&self, _tty: &mut Tty) {}
    }

    #[test]
    fn optional_capabilities_default_to_absent() {
        let ops = Inert;
        let mut tty = Tty::unassigned();
        assert!(!ops.pump_input(&mut tty));
        assert!(ops.ioctl(&mut tty, 0x5401, 0).is_none());
    }
}
