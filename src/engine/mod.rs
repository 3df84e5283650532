// src/engine/mod.rs

//! Async IO shell around the synchronous scheduler core.
//!
//! The queue itself is single-threaded and knows nothing about channels or
//! Tokio. This module ties it to the outside world:
//!
//! - [`DriverEvent`]s flow in from the interval ticker, timers, simulated
//!   loads, the scenario script, and Ctrl-C handling.
//! - the [`Driver`] receive loop routes each event to the matching host
//!   object and then reactively ticks the queue.

pub mod driver;

use crate::host::timers::TimerId;

pub use driver::Driver;

/// Events flowing into the driver from tickers, timers, loads, and the
/// scenario script. Deliberately plain data — everything that crosses a
/// channel is `Send` even though the scheduler core is not.
#[derive(Debug, Clone)]
pub enum DriverEvent {
    /// Periodic driver tick; advances the queue by one selection.
    Tick,
    /// The external system reported a named event.
    EventRaised { event: String },
    /// A timer created through the timer host expired.
    TimerExpired { timer: TimerId },
    /// A simulated content load resolved.
    LoadFinished { path: String, success: bool },
    /// A package member signalled readiness.
    MemberReady { package: String, member: String },
    /// The modal-transition lock was taken or released.
    LockChanged { held: bool },
    /// A UI affordance became active or inactive.
    AffordanceChanged { affordance: String, active: bool },
    /// Graceful shutdown requested (e.g. Ctrl-C or a script step).
    ShutdownRequested,
}

/// Options that influence how the driver behaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverOptions {
    /// If true, exit once the queue is empty, the script has been fully
    /// delivered, and no loads are in flight (used for `--once`).
    pub exit_when_idle: bool,
    /// Stop after this many interval ticks, even with work remaining
    /// (used for `--ticks`).
    pub max_ticks: Option<u64>,
}
