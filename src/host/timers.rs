// src/host/timers.rs

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::DriverEvent;
use crate::host::{TimerCallback, TimerService};

/// Identity of a created timer.
pub type TimerId = u64;

struct TimerEntry {
    name: String,
    duration: Duration,
    repeating: bool,
    callback: TimerCallback,
    running: Option<tokio::task::JoinHandle<()>>,
}

/// Timer host backed by Tokio sleeps.
///
/// `create` only records the timer; `start` spawns a sleep that sends
/// [`DriverEvent::TimerExpired`] into the driver channel on every expiry.
/// The driver then calls [`TokioTimers::fire`] on its own thread, which is
/// where the callback actually runs — callbacks are plain `Rc` closures and
/// never leave the scheduling thread.
pub struct TokioTimers {
    inner: RefCell<TimersInner>,
    events_tx: mpsc::Sender<DriverEvent>,
}

#[derive(Default)]
struct TimersInner {
    timers: HashMap<TimerId, TimerEntry>,
    next_id: TimerId,
}

impl TokioTimers {
    pub fn new(events_tx: mpsc::Sender<DriverEvent>) -> Self {
        Self {
            inner: RefCell::new(TimersInner::default()),
            events_tx,
        }
    }

    /// Run the callback of an expired timer, if it still exists.
    ///
    /// Expiries for timers destroyed in the meantime are ignored; the race
    /// between an expiry in flight and `destroy` is expected and harmless.
    pub fn fire(&self, id: TimerId) {
        let callback = {
            let inner = self.inner.borrow();
            inner.timers.get(&id).map(|entry| Rc::clone(&entry.callback))
        };

        match callback {
            Some(callback) => callback(),
            None => debug!(timer = id, "expiry for destroyed timer; ignoring"),
        }
    }
}

impl TimerService for TokioTimers {
    fn create(
        &self,
        duration: Duration,
        repeating: bool,
        name: &str,
        on_expire: TimerCallback,
    ) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.timers.insert(
            id,
            TimerEntry {
                name: name.to_string(),
                duration,
                repeating,
                callback: on_expire,
                running: None,
            },
        );
        debug!(timer = id, name = %name, ?duration, repeating, "created timer");
        id
    }

    fn start(&self, id: TimerId) {
        let mut inner = self.inner.borrow_mut();
        let Some(entry) = inner.timers.get_mut(&id) else {
            warn!(timer = id, "start requested for unknown timer; ignoring");
            return;
        };
        if entry.running.is_some() {
            return;
        }

        let tx = self.events_tx.clone();
        let duration = entry.duration;
        let repeating = entry.repeating;
        debug!(timer = id, name = %entry.name, "starting timer");

        // Only the expiry notification crosses the channel; the callback
        // stays on the scheduling thread.
        entry.running = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(duration).await;
                if tx.send(DriverEvent::TimerExpired { timer: id }).await.is_err() {
                    break;
                }
                if !repeating {
                    break;
                }
            }
        }));
    }

    fn stop(&self, id: TimerId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(entry) = inner.timers.get_mut(&id)
            && let Some(handle) = entry.running.take()
        {
            handle.abort();
        }
    }

    fn destroy(&self, id: TimerId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(entry) = inner.timers.remove(&id) {
            if let Some(handle) = entry.running {
                handle.abort();
            }
            debug!(timer = id, name = %entry.name, "destroyed timer");
        }
    }
}
