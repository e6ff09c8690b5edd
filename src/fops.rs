//! Terminal file operations facade
//!
//! The uniform entry points external I/O dispatch invokes against a
//! terminal device: open, release, read, write, ioctl, select, and a
//! seek that only reports "not seekable". Each call resolves the
//! device minor to its control block and drives the line-discipline
//! engine.

use crate::device::OpenFlags;
use crate::errno::Errno;
use crate::kernel::{Kernel, WaitEvent, SIGHUP};
use crate::termios::Termios;
use crate::tty::{TtyFlags, TtyTable, TTY_ALIAS_MINOR};

// ioctl command codes, Linux values.

/// Get terminal settings
pub const TCGETS: u32 = 0x5401;

/// Set terminal settings immediately
pub const TCSETS: u32 = 0x5402;

/// Set terminal settings after draining output
pub const TCSETSW: u32 = 0x5403;

/// Set terminal settings after flushing input and draining output
pub const TCSETSF: u32 = 0x5404;

/// What a select() caller is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    Read,
    Write,
}

/// Copy settings out to a user-space address.
///
/// Stands in for the kernel's verified user-copy primitive: a null
/// address is the copy fault.
fn put_user_termios(termios: &Termios, arg: u64) -> Result<(), Errno> {
    if arg == 0 {
        return Err(Errno::BadAddress);
    }
    // SAFETY: non-null checked above; the dispatch layer is responsible
    // for the address being mapped in the current address space.
    unsafe {
        core::ptr::write_volatile(arg as *mut Termios, *termios);
    }
    Ok(())
}

/// Copy settings in from a user-space address.
fn get_user_termios(arg: u64) -> Result<Termios, Errno> {
    if arg == 0 {
        return Err(Errno::BadAddress);
    }
    // SAFETY: non-null checked above; see `put_user_termios`.
    Ok(unsafe { core::ptr::read_volatile(arg as *const Termios) })
}

impl TtyTable {
    /// Open a terminal device.
    ///
    /// Fails `NoSuchDevice` if the minor resolves to nothing and
    /// `Busy` on an exclusive open of an already-open terminal. The
    /// controlling-terminal alias succeeds without touching the
    /// backend. On a successful backend open the terminal becomes the
    /// caller's controlling terminal when the caller is a session
    /// leader without one, the terminal is unowned, and `NOCTTY` was
    /// not requested.
    pub fn open(
        &mut self,
        kernel: &mut dyn Kernel,
        minor: u16,
        flags: OpenFlags,
    ) -> Result<(), Errno> {
        let tty = self.resolve(&*kernel, minor).ok_or(Errno::NoSuchDevice)?;

        if flags.contains(OpenFlags::EXCL) && tty.flags.contains(TtyFlags::OPEN) {
            return Err(Errno::Busy);
        }

        // /dev/tty: the real device is already open, nothing to do.
        if minor == TTY_ALIAS_MINOR {
            return Ok(());
        }

        let ops = tty.ops()?;
        ops.open(tty)?;

        if !flags.contains(OpenFlags::NOCTTY)
            && kernel.current_session() == kernel.current_pid()
            && tty.pgrp == 0
            && kernel.controlling_tty().is_none()
        {
            tty.pgrp = kernel.current_pgrp();
            kernel.set_controlling_tty(Some(tty.minor));
            log::debug!("tty{}: controlling pgrp set to {}", tty.minor, tty.pgrp);
        }
        tty.flags |= TtyFlags::OPEN;
        Ok(())
    }

    /// Release a terminal device.
    ///
    /// Silently ignores unknown minors and the controlling-terminal
    /// alias. When the releasing process owns the terminal's group, a
    /// hang-up is sent to that group and the group is cleared. The
    /// open flag is dropped and the backend released unconditionally.
    pub fn release(&mut self, kernel: &mut dyn Kernel, minor: u16) {
        let Some(tty) = self.resolve(&*kernel, minor) else {
            return;
        };
        if minor == TTY_ALIAS_MINOR {
            return;
        }

        if kernel.current_pid() == tty.pgrp {
            log::debug!("tty{}: hangup to pgrp {}", tty.minor, tty.pgrp);
            kernel.kill_group(tty.pgrp, SIGHUP);
            tty.pgrp = 0;
        }
        tty.flags &= !TtyFlags::OPEN;
        if let Ok(ops) = tty.ops() {
            ops.release(tty);
        }
    }

    /// Read from a terminal device through the line discipline.
    pub fn read(
        &mut self,
        kernel: &mut dyn Kernel,
        minor: u16,
        buf: &mut [u8],
        flags: OpenFlags,
    ) -> Result<usize, Errno> {
        let tty = self.resolve(&*kernel, minor).ok_or(Errno::NoSuchDevice)?;
        tty.read(kernel, buf, flags)
    }

    /// Write to a terminal device through the line discipline.
    pub fn write(
        &mut self,
        kernel: &mut dyn Kernel,
        minor: u16,
        buf: &[u8],
        flags: OpenFlags,
    ) -> Result<usize, Errno> {
        let tty = self.resolve(&*kernel, minor).ok_or(Errno::NoSuchDevice)?;
        tty.write(kernel, buf, flags)
    }

    /// Terminal ioctl.
    ///
    /// `TCGETS` copies the current settings out; the `TCSETS` family
    /// copies new settings in and then notifies the backend (drain and
    /// flush variants are the backend's concern, e.g. for baud-rate
    /// changes). Anything else passes straight through to the backend,
    /// or fails `InvalidArgument` when the backend has no ioctl.
    pub fn ioctl(
        &mut self,
        kernel: &mut dyn Kernel,
        minor: u16,
        cmd: u32,
        arg: u64,
    ) -> Result<(), Errno> {
        let tty = self.resolve(&*kernel, minor).ok_or(Errno::NoSuchDevice)?;
        match cmd {
            TCGETS => put_user_termios(&tty.termios, arg),
            TCSETS | TCSETSW | TCSETSF => {
                // A copy fault aborts before the backend hears anything.
                tty.termios = get_user_termios(arg)?;
                let ops = tty.ops()?;
                ops.ioctl(tty, cmd, arg).unwrap_or(Ok(()))
            }
            _ => {
                let ops = tty.ops()?;
                ops.ioctl(tty, cmd, arg)
                    .unwrap_or(Err(Errno::InvalidArgument))
            }
        }
    }

    /// Poll a terminal for readiness.
    ///
    /// Readable when the input queue holds data, writable when the
    /// output queue has room; the not-ready side registers the calling
    /// context on the queue's wait channel.
    pub fn select(
        &mut self,
        kernel: &mut dyn Kernel,
        minor: u16,
        mode: SelectMode,
    ) -> Result<bool, Errno> {
        let tty = self.resolve(&*kernel, minor).ok_or(Errno::NoSuchDevice)?;
        let ready = match mode {
            SelectMode::Read => {
                if tty.inq.is_empty() {
                    kernel.select_wait(WaitEvent::input(tty.minor));
                    false
                } else {
                    true
                }
            }
            SelectMode::Write => {
                if tty.outq.is_full() {
                    kernel.select_wait(WaitEvent::output(tty.minor));
                    false
                } else {
                    true
                }
            }
        };
        Ok(ready)
    }

    /// Terminals are not seekable.
    pub fn lseek(&mut self, _kernel: &dyn Kernel, _minor: u16, _offset: i64) -> Result<u64, Errno> {
        Err(Errno::IllegalSeek)
    }
}
