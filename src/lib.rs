//! Terminal line-discipline core
//!
//! The device-independent half of a Unix terminal subsystem: canonical
//! line editing, output post-processing, echo, termios handling,
//! terminal-generated signals and VMIN/VTIME read timing, all layered
//! over bounded circular character queues.
//!
//! The crate is `no_std` + `alloc` and owns no hardware and no
//! processes. Concrete device drivers plug in underneath through the
//! [`DeviceOps`] trait; the host system plugs in above through the
//! [`Kernel`] trait, which supplies process identity, signal delivery,
//! sleep/wake and the clock. A [`TtyTable`] ties the two together and
//! exposes the file-operation surface (`open`, `release`, `read`,
//! `write`, `ioctl`, `select`, `lseek`) that external I/O dispatch
//! calls into.
//!
//! ```
//! use ttycore::{OpenFlags, TtyTable};
//! # use ttycore::{DeviceOps, Errno, Kernel, Tty, WaitEvent};
//! # use std::sync::Arc;
//! # struct Loopback;
//! # impl DeviceOps for Loopback {
//! #     fn open(&self, tty: &mut Tty) -> Result<(), Errno> {
//! #         tty.alloc_queues(64, 64)
//! #     }
//! #     fn release(&self, tty: &mut Tty) { tty.free_queues() }
//! #     fn pump_output(&self, _tty: &mut Tty) {}
//! # }
//! # struct Host;
//! # impl Kernel for Host {
//! #     fn current_pid(&self) -> u32 { 1 }
//! #     fn current_pgrp(&self) -> u32 { 1 }
//! #     fn current_session(&self) -> u32 { 1 }
//! #     fn controlling_tty(&self) -> Option<u16> { None }
//! #     fn set_controlling_tty(&mut self, _m: Option<u16>) {}
//! #     fn kill_group(&mut self, _pgrp: u32, _sig: u32) {}
//! #     fn sleep_on(&mut self, _ev: WaitEvent) -> Result<(), Errno> { Ok(()) }
//! #     fn select_wait(&mut self, _ev: WaitEvent) {}
//! #     fn yield_now(&mut self) {}
//! #     fn ticks(&self) -> u64 { 0 }
//! # }
//! let mut table = TtyTable::new();
//! table.register_range(Arc::new(Loopback), 0, 1)?;
//!
//! let mut host = Host;
//! table.open(&mut host, 0, OpenFlags::empty())?;
//! table.write(&mut host, 0, b"hello\n", OpenFlags::empty())?;
//! # Ok::<(), ttycore::Errno>(())
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod chq;
pub mod device;
pub mod errno;
pub mod fops;
pub mod kernel;
pub mod ldisc;
pub mod termios;
pub mod tty;

pub use chq::CharQueue;
pub use device::{DeviceOps, OpenFlags};
pub use errno::Errno;
pub use fops::{SelectMode, TCGETS, TCSETS, TCSETSF, TCSETSW};
pub use kernel::{Kernel, QueueSide, WaitEvent, HZ, SIGHUP, SIGINT, SIGTSTP};
pub use ldisc::TAB_SPACES;
pub use termios::Termios;
pub use tty::{
    OutputState, Tty, TtyFlags, TtyTable, CONSOLE_MINOR_BASE, MAX_TTYS, PTY_MINOR_BASE,
    SERIAL_MINOR_BASE, TTY_ALIAS_MINOR,
};
