//! Line discipline engine
//!
//! The behavioral core of the terminal layer: the canonical and
//! VMIN/VTIME read algorithm, the per-byte write loop, output
//! post-processing (tab and newline expansion) and echo. Everything
//! here operates on a [`Tty`] control block and reaches the scheduler
//! only through the [`Kernel`] collaborator.

use crate::device::OpenFlags;
use crate::errno::Errno;
use crate::kernel::{Kernel, WaitEvent, SIGINT, SIGTSTP, TICKS_PER_DECISECOND};
use crate::termios::{ECHO, ECHOE, ECHONL};
use crate::tty::{OutputState, Tty};

/// Columns per hardware tab stop.
pub const TAB_SPACES: u8 = 8;

const BS: u8 = 0x08;

impl Tty {
    /// Map a received control character to a process-group signal.
    ///
    /// Active only when ISIG is set and the terminal has a controlling
    /// group. VINTR raises SIGINT, VSUSP raises SIGTSTP (checked
    /// second, so it wins if both are bound to the same byte). The
    /// signal is delivered to every process in the group and returned.
    pub fn check_interrupt(&self, kernel: &mut dyn Kernel, ch: u8) -> Option<u32> {
        if !self.termios.is_sig() || self.pgrp == 0 {
            return None;
        }
        let mut sig = None;
        if ch == self.termios.intr_char() {
            sig = Some(SIGINT);
        }
        if ch == self.termios.susp_char() {
            sig = Some(SIGTSTP);
        }
        if let Some(sig) = sig {
            log::debug!("tty{}: signal {} to pgrp {}", self.minor, sig, self.pgrp);
            kernel.kill_group(self.pgrp, sig);
        }
        sig
    }

    /// Echo an accepted input byte back through the output queue.
    ///
    /// No-op unless ECHO is set (or ECHONL is set and the byte is a
    /// newline). The erase character renders as backspace-space-
    /// backspace when ECHOE is set, wiping one column.
    pub fn echo(&mut self, ch: u8) {
        let lflag = self.termios.c_lflag;
        if (lflag & ECHO) == 0 && !((lflag & ECHONL) != 0 && ch == b'\n') {
            return;
        }
        if ch == self.termios.erase_char() && (lflag & ECHOE) != 0 {
            let _ = self.outq.push(BS);
            let _ = self.outq.push(b' ');
            let _ = self.outq.push(BS);
        } else {
            let _ = self.outq.push(ch);
        }
        if let Ok(ops) = self.ops() {
            ops.pump_output(self);
        }
    }

    /// Produce the next byte for the hardware, applying output
    /// post-processing.
    ///
    /// Peeks the head of the output queue; with OPOST set, a newline
    /// becomes CR now and NL on the following call (ONLCR), and a tab
    /// becomes [`TAB_SPACES`] spaces across as many calls (TAB3). The
    /// queued byte is dequeued only once its full expansion has been
    /// emitted, so the queue length drops by exactly one per logical
    /// byte.
    ///
    /// Backends drain with:
    /// ```ignore
    /// while let Some(ch) = tty.next_output_byte() {
    ///     device.transmit(ch);
    /// }
    /// ```
    pub fn next_output_byte(&mut self) -> Option<u8> {
        let mut ch = self.outq.peek()?;
        if self.termios.is_opost() {
            match self.ostate {
                OutputState::TabExpanding(remaining) => {
                    ch = b' ';
                    self.ostate = if remaining > 1 {
                        OutputState::TabExpanding(remaining - 1)
                    } else {
                        OutputState::Idle
                    };
                }
                OutputState::NewlinePending => {
                    // The queued NL itself goes out this time.
                    self.ostate = OutputState::Idle;
                }
                OutputState::Idle => {
                    if ch == b'\n' && self.termios.is_onlcr() {
                        ch = b'\r';
                        self.ostate = OutputState::NewlinePending;
                    } else if ch == b'\t' && self.termios.is_tab_expand() {
                        ch = b' ';
                        self.ostate = OutputState::TabExpanding(TAB_SPACES - 1);
                    }
                }
            }
        }
        if self.ostate == OutputState::Idle {
            self.outq.pop();
        }
        Some(ch)
    }

    /// Block until the input queue has a byte, or fail with
    /// `WouldBlock` in non-blocking mode.
    fn wait_input(&mut self, kernel: &mut dyn Kernel, nonblock: bool) -> Result<(), Errno> {
        while self.inq.is_empty() {
            if nonblock {
                return Err(Errno::WouldBlock);
            }
            kernel.sleep_on(WaitEvent::input(self.minor))?;
        }
        Ok(())
    }

    /// Block until the output queue has room, or fail with
    /// `WouldBlock` in non-blocking mode.
    fn wait_output_room(&mut self, kernel: &mut dyn Kernel, nonblock: bool) -> Result<(), Errno> {
        while self.outq.is_full() {
            if nonblock {
                return Err(Errno::WouldBlock);
            }
            kernel.sleep_on(WaitEvent::output(self.minor))?;
        }
        Ok(())
    }

    /// Read from the terminal with line-discipline processing.
    ///
    /// Canonical mode applies erase handling, ICRNL translation, VEOF
    /// termination and echo; the read ends at newline or VEOL.
    /// Non-canonical mode honors VMIN/VTIME: the inter-byte timer is
    /// armed after the first byte when both are set, and a read with
    /// VTIME but no VMIN is a pure timeout poll.
    ///
    /// Returns the byte count delivered; an error surfaces only when
    /// nothing was delivered (partial progress always wins).
    pub fn read(
        &mut self,
        kernel: &mut dyn Kernel,
        buf: &mut [u8],
        flags: OpenFlags,
    ) -> Result<usize, Errno> {
        let icanon = self.termios.is_canonical();
        let vmin = usize::from(self.termios.vmin());
        let vtime = self.termios.vtime();
        // VTIME without VMIN is a pure timeout: never sleep on the queue.
        let mut nonblock =
            flags.contains(OpenFlags::NONBLOCK) || (!icanon && vtime > 0 && vmin == 0);
        let ops = self.ops().ok();
        let mut count = 0usize;

        'collect: while count < buf.len() {
            // Inter-byte deadline, re-armed every time a byte lands.
            let deadline = kernel.ticks() + u64::from(vtime) * TICKS_PER_DECISECOND;

            let ch = loop {
                if let Some(ops) = &ops {
                    // Polling backends feed the queue here and force
                    // the rest of the call non-blocking.
                    if ops.pump_input(self) {
                        nonblock = true;
                    }
                }

                if let Some(ch) = self.inq.pop() {
                    break ch;
                }

                if !icanon && vtime == 0 && count >= vmin {
                    break 'collect;
                }

                match self.wait_input(kernel, nonblock) {
                    Ok(()) => {
                        if let Some(ch) = self.inq.pop() {
                            break ch;
                        }
                        // Spurious wakeup; the timer keeps running.
                        continue;
                    }
                    Err(err) => {
                        if !icanon && vtime > 0 {
                            if kernel.ticks() < deadline {
                                kernel.yield_now();
                                continue;
                            }
                            if vmin > 0 && count == 0 {
                                // Nothing collected yet: the timer only
                                // spans bytes, so re-arm and keep polling.
                                nonblock = true;
                                continue 'collect;
                            }
                            // Timed out: deliver whatever arrived.
                            break 'collect;
                        }
                        if count == 0 {
                            return Err(err);
                        }
                        break 'collect;
                    }
                }
            };

            if icanon {
                if ch == self.termios.erase_char() {
                    if count > 0 {
                        count -= 1;
                        // The byte just removed from the caller's buffer
                        // decides how many columns to wipe; a tab erases a
                        // full stop's worth. This is a heuristic, not a
                        // column tracker.
                        let cols = if buf[count] == b'\t' { TAB_SPACES } else { 1 };
                        for _ in 0..cols {
                            self.echo(ch);
                        }
                    }
                    continue 'collect;
                }
                let ch = if self.termios.is_icrnl() && ch == b'\r' {
                    b'\n'
                } else {
                    ch
                };
                if ch == self.termios.eof_char() {
                    break 'collect;
                }
                buf[count] = ch;
                self.echo(ch);
                count += 1;
                if ch == b'\n' || ch == self.termios.eol_char() {
                    break 'collect;
                }
            } else {
                if vtime > 0 && vmin > 0 {
                    // First byte landed: arm the inter-byte timer.
                    nonblock = true;
                }
                buf[count] = ch;
                self.echo(ch);
                count += 1;
            }
        }
        Ok(count)
    }

    /// Write to the terminal, one byte at a time.
    ///
    /// Each byte waits for output-queue room (failing fast under
    /// `NONBLOCK`), is enqueued, and triggers a backend output pump so
    /// devices without transmit interrupts flush synchronously. A
    /// partial count is returned in preference to an error.
    pub fn write(
        &mut self,
        kernel: &mut dyn Kernel,
        buf: &[u8],
        flags: OpenFlags,
    ) -> Result<usize, Errno> {
        let nonblock = flags.contains(OpenFlags::NONBLOCK);
        let ops = self.ops().ok();
        let mut count = 0usize;

        while count < buf.len() {
            if let Err(err) = self.wait_output_room(kernel, nonblock) {
                if count == 0 {
                    return Err(err);
                }
                break;
            }
            let _ = self.outq.push(buf[count]);
            if let Some(ops) = &ops {
                ops.pump_output(self);
            }
            count += 1;
        }
        Ok(count)
    }
}
