// src/engine/driver.rs

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::host::{Affordance, EventBus, SimLoader, TokioTimers, TransitionLock};
use crate::queue::Queue;
use crate::task::{MatchKey, Package};

use super::{DriverEvent, DriverOptions};

/// The driver: consumes [`DriverEvent`]s and advances the queue.
///
/// Each event is routed to the host object it concerns (bus dispatch, timer
/// fire, load completion, lock/affordance toggles) and then the queue gets a
/// reactive `run` — a readiness change is worth noticing immediately rather
/// than waiting for the next interval tick.
pub struct Driver {
    queue: Queue,
    lock: TransitionLock,
    bus: EventBus,
    timers: Rc<TokioTimers>,
    loader: Rc<SimLoader>,
    packages: HashMap<String, Rc<Package>>,
    affordances: HashMap<String, Affordance>,
    options: DriverOptions,
    events_rx: mpsc::Receiver<DriverEvent>,
    /// Scripted events still expected; used for `exit_when_idle`.
    script_remaining: usize,
    ticks_seen: u64,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("queued", &self.queue.len())
            .field("script_remaining", &self.script_remaining)
            .finish_non_exhaustive()
    }
}

impl Driver {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: Queue,
        lock: TransitionLock,
        bus: EventBus,
        timers: Rc<TokioTimers>,
        loader: Rc<SimLoader>,
        packages: HashMap<String, Rc<Package>>,
        affordances: HashMap<String, Affordance>,
        options: DriverOptions,
        events_rx: mpsc::Receiver<DriverEvent>,
        script_total: usize,
    ) -> Self {
        Self {
            queue,
            lock,
            bus,
            timers,
            loader,
            packages,
            affordances,
            options,
            events_rx,
            script_remaining: script_total,
            ticks_seen: 0,
        }
    }

    /// Main event loop.
    pub async fn run(mut self) -> Result<()> {
        info!("showrunner driver started");

        loop {
            let event = match self.events_rx.recv().await {
                Some(event) => event,
                None => {
                    info!("driver event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "driver received event");
            if !self.handle_event(event) {
                break;
            }

            if self.options.exit_when_idle
                && self.script_remaining == 0
                && self.queue.is_empty()
                && self.loader.pending_count() == 0
            {
                info!("queue idle and exit_when_idle=true; stopping driver");
                break;
            }
        }

        info!("driver exiting");
        Ok(())
    }

    /// Route one event; returns false when the loop should stop.
    fn handle_event(&mut self, event: DriverEvent) -> bool {
        match event {
            DriverEvent::Tick => {
                self.ticks_seen += 1;
            }
            DriverEvent::EventRaised { event } => {
                self.note_script_event();
                let handlers = self.bus.dispatch(&event);
                debug!(event = %event, handlers, "raised named event");
            }
            DriverEvent::TimerExpired { timer } => {
                self.timers.fire(timer);
            }
            DriverEvent::LoadFinished { path, success } => {
                self.loader.complete(&path, success);
            }
            DriverEvent::MemberReady { package, member } => {
                self.note_script_event();
                match self.packages.get(&package) {
                    Some(pkg) => {
                        pkg.member_ready(&MatchKey::name(member));
                    }
                    None => warn!(package = %package, "readiness signal for unknown package; ignoring"),
                }
            }
            DriverEvent::LockChanged { held } => {
                self.note_script_event();
                debug!(held, "modal-transition lock changed");
                self.lock.set_transitioning(held);
            }
            DriverEvent::AffordanceChanged { affordance, active } => {
                self.note_script_event();
                match self.affordances.get(&affordance) {
                    Some(handle) => handle.set_active(active),
                    None => warn!(affordance = %affordance, "toggle for unknown affordance; ignoring"),
                }
            }
            DriverEvent::ShutdownRequested => {
                info!("shutdown requested, stopping driver");
                return false;
            }
        }

        // Reactive tick: every event may have changed someone's readiness.
        self.queue.run();

        if let Some(max) = self.options.max_ticks
            && self.ticks_seen >= max
        {
            info!(ticks = self.ticks_seen, "tick budget exhausted, stopping driver");
            return false;
        }
        true
    }

    fn note_script_event(&mut self) {
        self.script_remaining = self.script_remaining.saturating_sub(1);
    }
}
