//! Terminal control blocks and the terminal registry
//!
//! One [`Tty`] per physical or logical terminal device, collected in a
//! fixed-size [`TtyTable`] initialized once at startup. Slots are
//! assigned contiguous minor ranges per backend category at
//! registration time and are reset, never destroyed.

use alloc::sync::Arc;
use alloc::vec::Vec;
use bitflags::bitflags;

use crate::chq::CharQueue;
use crate::device::DeviceOps;
use crate::errno::Errno;
use crate::kernel::Kernel;
use crate::termios::Termios;

/// Capacity of the terminal table.
pub const MAX_TTYS: usize = 8;

/// Minor number aliasing "my controlling terminal" (/dev/tty).
pub const TTY_ALIAS_MINOR: u16 = 255;

/// First console minor.
pub const CONSOLE_MINOR_BASE: u16 = 0;

/// First pseudo-terminal slave minor.
pub const PTY_MINOR_BASE: u16 = 8;

/// First serial-line minor.
pub const SERIAL_MINOR_BASE: u16 = 64;

/// Minor sentinel marking an unassigned slot. 16-bit so it can never
/// collide with the 8-bit device minor space (including the alias).
const NO_MINOR: u16 = u16::MAX;

bitflags! {
    /// Control-block state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TtyFlags: u8 {
        /// Set between a successful backend open and release
        const OPEN = 0x01;
    }
}

/// Output post-processor sub-state: what the next `next_output_byte`
/// call must emit before the queued byte is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    /// No expansion in progress
    Idle,
    /// A CR was just emitted for a queued NL; the NL itself is next
    NewlinePending,
    /// Mid tab-to-spaces expansion with this many spaces remaining
    TabExpanding(u8),
}

/// Terminal control block.
pub struct Tty {
    /// Device minor, or the unassigned sentinel
    pub minor: u16,

    /// Current terminal settings
    pub termios: Termios,

    /// Input queue, raw bytes from the device
    pub inq: CharQueue,

    /// Output queue, bytes awaiting post-processing and transmission
    pub outq: CharQueue,

    /// Output post-processing state
    pub ostate: OutputState,

    /// Controlling process group (0 = none)
    pub pgrp: u32,

    /// State bits
    pub flags: TtyFlags,

    /// Backend operation table, bound at registration
    pub ops: Option<Arc<dyn DeviceOps>>,
}

impl Tty {
    /// A free slot: sentinel minor, default settings, no queues.
    pub fn unassigned() -> Self {
        Self {
            minor: NO_MINOR,
            termios: Termios::default(),
            inq: CharQueue::empty(),
            outq: CharQueue::empty(),
            ostate: OutputState::Idle,
            pgrp: 0,
            flags: TtyFlags::empty(),
            ops: None,
        }
    }

    /// Whether this slot has been assigned a device.
    pub fn is_assigned(&self) -> bool {
        self.minor != NO_MINOR
    }

    /// Allocate the input and output queues, typically from the
    /// backend's `open`. Capacities must be powers of two.
    ///
    /// If the second allocation fails the first is released before
    /// returning, so a failed open leaks nothing.
    pub fn alloc_queues(&mut self, in_capacity: usize, out_capacity: usize) -> Result<(), Errno> {
        let inq = CharQueue::with_capacity(in_capacity)?;
        // An error here drops `inq` on the way out.
        let outq = CharQueue::with_capacity(out_capacity)?;
        self.inq = inq;
        self.outq = outq;
        Ok(())
    }

    /// Release both queues. Always frees the pair together.
    pub fn free_queues(&mut self) {
        self.inq = CharQueue::empty();
        self.outq = CharQueue::empty();
    }

    /// The backend operation table, shared handle.
    pub(crate) fn ops(&self) -> Result<Arc<dyn DeviceOps>, Errno> {
        self.ops.clone().ok_or(Errno::NoSuchDevice)
    }
}

/// Registry of all terminal control blocks, the unit of state
/// ownership for the subsystem.
///
/// Not internally synchronized: all calls must come from the single
/// cooperative service thread (see the [`kernel`](crate::kernel)
/// module contract).
pub struct TtyTable {
    slots: Vec<Tty>,
}

impl TtyTable {
    /// Build the table with [`MAX_TTYS`] free slots, default settings
    /// applied once here and not reapplied on open.
    pub fn new() -> Self {
        Self::with_slots(MAX_TTYS)
    }

    /// Build a table with a custom slot count.
    pub fn with_slots(count: usize) -> Self {
        let mut slots = Vec::with_capacity(count);
        for _ in 0..count {
            slots.push(Tty::unassigned());
        }
        Self { slots }
    }

    /// Bind `count` contiguous minors starting at `first_minor` to a
    /// backend, taking the next free slots. `OutOfMemory` if the table
    /// has too few free slots left.
    pub fn register_range(
        &mut self,
        ops: Arc<dyn DeviceOps>,
        first_minor: u16,
        count: usize,
    ) -> Result<(), Errno> {
        let free: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_assigned())
            .map(|(i, _)| i)
            .take(count)
            .collect();
        if free.len() < count {
            return Err(Errno::OutOfMemory);
        }
        for (n, idx) in free.into_iter().enumerate() {
            let slot = &mut self.slots[idx];
            slot.minor = first_minor + n as u16;
            slot.ops = Some(ops.clone());
        }
        log::debug!(
            "tty: registered minors {}..{}",
            first_minor,
            first_minor + count as u16
        );
        Ok(())
    }

    /// Number of slots in the table.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Look a terminal up by its real minor number.
    pub fn by_minor(&mut self, minor: u16) -> Option<&mut Tty> {
        self.slots.iter_mut().find(|t| t.minor == minor)
    }

    /// Turn a device minor into its terminal, or `None` if no slot
    /// matches.
    ///
    /// The alias minor resolves to the calling process's controlling
    /// terminal, but only when the caller's group matches slot 0's
    /// group (the single-controlling-terminal compatibility shortcut);
    /// otherwise it falls through to the scan, which never matches the
    /// alias value.
    pub fn resolve(&mut self, kernel: &dyn Kernel, minor: u16) -> Option<&mut Tty> {
        if minor == TTY_ALIAS_MINOR {
            let pgrp = kernel.current_pgrp();
            if pgrp != 0 && self.slots.first().map(|t| t.pgrp) == Some(pgrp) {
                let ctty = kernel.controlling_tty()?;
                return self.by_minor(ctty);
            }
        }
        self.by_minor(minor)
    }
}

impl Default for TtyTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::WaitEvent;

    struct Inert;

    impl DeviceOps for Inert {
        fn open(&self, _tty: &mut Tty) -> Result<(), Errno> {
            Ok(())
        }
        fn release(&self, _tty: &mut Tty) {}
        fn pump_output(&self, _tty: &mut Tty) {}
    }

    struct Proc {
        pid: u32,
        pgrp: u32,
        tty: Option<u16>,
    }

    impl Kernel for Proc {
        fn current_pid(&self) -> u32 {
            self.pid
        }
        fn current_pgrp(&self) -> u32 {
            self.pgrp
        }
        fn current_session(&self) -> u32 {
            self.pid
        }
        fn controlling_tty(&self) -> Option<u16> {
            self.tty
        }
        fn set_controlling_tty(&mut self, minor: Option<u16>) {
            self.tty = minor;
        }
        fn kill_group(&mut self, _pgrp: u32, _sig: u32) {}
        fn sleep_on(&mut self, _ev: WaitEvent) -> Result<(), Errno> {
            Err(Errno::Interrupted)
        }
        fn select_wait(&mut self, _ev: WaitEvent) {}
        fn yield_now(&mut self) {}
        fn ticks(&self) -> u64 {
            0
        }
    }

    #[test]
    fn fresh_table_has_free_slots_with_defaults() {
        let mut table = TtyTable::new();
        assert_eq!(table.len(), MAX_TTYS);
        assert!(table.by_minor(0).is_none());
        assert!(table.by_minor(NO_MINOR).is_none());
    }

    #[test]
    fn registration_assigns_contiguous_minors() {
        let mut table = TtyTable::new();
        let ops = Arc::new(Inert);
        table.register_range(ops.clone(), CONSOLE_MINOR_BASE, 3).unwrap();
        table.register_range(ops, SERIAL_MINOR_BASE, 2).unwrap();

        for minor in [0u16, 1, 2, 64, 65] {
            let tty = table.by_minor(minor).unwrap();
            assert_eq!(tty.minor, minor);
            assert!(tty.ops.is_some());
        }
        assert!(table.by_minor(3).is_none());
        assert!(table.by_minor(66).is_none());
    }

    #[test]
    fn registration_fails_when_table_full() {
        let mut table = TtyTable::with_slots(2);
        let ops = Arc::new(Inert);
        table.register_range(ops.clone(), 0, 2).unwrap();
        assert_eq!(table.register_range(ops, 64, 1), Err(Errno::OutOfMemory));
    }

    #[test]
    fn minors_are_unique() {
        let mut table = TtyTable::new();
        let ops = Arc::new(Inert);
        table.register_range(ops, 0, MAX_TTYS).unwrap();

        for minor in 0..MAX_TTYS as u16 {
            let mut seen = 0;
            for slot in &mut table.slots {
                if slot.minor == minor {
                    seen += 1;
                }
            }
            assert_eq!(seen, 1, "minor {minor} assigned more than once");
        }
    }

    #[test]
    fn resolve_scans_by_minor() {
        let mut table = TtyTable::new();
        table.register_range(Arc::new(Inert), 0, 2).unwrap();
        let kernel = Proc {
            pid: 10,
            pgrp: 10,
            tty: None,
        };

        assert_eq!(table.resolve(&kernel, 1).map(|t| t.minor), Some(1));
        assert!(table.resolve(&kernel, 7).is_none());
    }

    #[test]
    fn alias_resolves_for_matching_group() {
        let mut table = TtyTable::new();
        table.register_range(Arc::new(Inert), 0, 2).unwrap();
        table.by_minor(0).unwrap().pgrp = 42;

        let kernel = Proc {
            pid: 42,
            pgrp: 42,
            tty: Some(1),
        };
        assert_eq!(
            table.resolve(&kernel, TTY_ALIAS_MINOR).map(|t| t.minor),
            Some(1)
        );
    }

    #[test]
    fn alias_fails_for_foreign_group() {
        let mut table = TtyTable::new();
        table.register_range(Arc::new(Inert), 0, 2).unwrap();
        table.by_minor(0).unwrap().pgrp = 42;

        // Wrong group: the alias does not apply and no slot carries
        // the alias minor, so resolution fails.
        let kernel = Proc {
            pid: 7,
            pgrp: 7,
            tty: Some(1),
        };
        assert!(table.resolve(&kernel, TTY_ALIAS_MINOR).is_none());

        // No group at all.
        let kernel = Proc {
            pid: 7,
            pgrp: 0,
            tty: Some(1),
        };
        assert!(table.resolve(&kernel, TTY_ALIAS_MINOR).is_none());
    }

    #[test]
    fn queue_allocation_and_release() {
        let mut tty = Tty::unassigned();
        tty.alloc_queues(64, 32).unwrap();
        assert_eq!(tty.inq.capacity(), 64);
        assert_eq!(tty.outq.capacity(), 32);

        tty.inq.push(b'x').unwrap();
        tty.free_queues();
        assert_eq!(tty.inq.capacity(), 0);
        assert_eq!(tty.outq.capacity(), 0);
    }
}
