//! Kernel collaborator interface
//!
//! The line discipline does not own process scheduling, signal delivery
//! or the tick clock; it reaches them through the [`Kernel`] trait. A
//! real kernel implements this over its scheduler and process table;
//! tests drive the subsystem with scripted implementations.
//!
//! The whole terminal layer runs on one cooperative service thread:
//! calls into [`TtyTable`](crate::tty::TtyTable) are non-reentrant and
//! must all come from that thread (or be serialized by the embedder if
//! adapted to preemptive scheduling).

use crate::errno::Errno;

/// Scheduler tick rate, ticks per second.
pub const HZ: u64 = 100;

/// Ticks per VTIME decisecond.
pub const TICKS_PER_DECISECOND: u64 = HZ / 10;

// Signal numbers, Linux layout.
pub const SIGHUP: u32 = 1;
pub const SIGINT: u32 = 2;
pub const SIGTSTP: u32 = 20;

/// Which side of a terminal's queue pair a waiter is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueSide {
    Input,
    Output,
}

/// Identifies a queue wait channel for sleep and select registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitEvent {
    /// Minor number of the terminal owning the queue
    pub minor: u16,
    pub side: QueueSide,
}

impl WaitEvent {
    pub fn input(minor: u16) -> Self {
        Self {
            minor,
            side: QueueSide::Input,
        }
    }

    pub fn output(minor: u16) -> Self {
        Self {
            minor,
            side: QueueSide::Output,
        }
    }
}

/// Services the terminal layer needs from the surrounding kernel.
pub trait Kernel {
    /// Pid of the process driving the current call.
    fn current_pid(&self) -> u32;

    /// Process group of the current process (0 = none).
    fn current_pgrp(&self) -> u32;

    /// Session id of the current process. A process whose session id
    /// equals its pid is a session leader.
    fn current_session(&self) -> u32;

    /// Minor of the current process's controlling terminal, if any.
    fn controlling_tty(&self) -> Option<u16>;

    /// Record (or clear) the current process's controlling terminal.
    fn set_controlling_tty(&mut self, minor: Option<u16>);

    /// Deliver `sig` to every process in group `pgrp`.
    fn kill_group(&mut self, pgrp: u32, sig: u32);

    /// Suspend the current process until the wait channel is signalled.
    ///
    /// Returns `Ok(())` when woken (wakeups may be spurious; the caller
    /// rechecks its condition) and `Err(Interrupted)` when a signal
    /// cut the sleep short.
    fn sleep_on(&mut self, ev: WaitEvent) -> Result<(), Errno>;

    /// Register the current select() context on a wait channel.
    fn select_wait(&mut self, ev: WaitEvent);

    /// Voluntarily yield the processor, used by the VTIME polling loop.
    fn yield_now(&mut self);

    /// Monotonic tick counter at `HZ` resolution.
    fn ticks(&self) -> u64;
}
