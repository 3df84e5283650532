// src/task/event.rs

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::host::{EventBus, HandlerId, TimerService, TransitionLock};
use crate::host::timers::TimerId;
use crate::priority::Priority;
use crate::queue::Queue;
use crate::task::{MatchKey, Task, TaskCore, TaskId, TaskState};

/// Event-wait task with a timeout bound.
///
/// Construction registers a bus handler that only flips a readiness flag;
/// the completion action runs on the next queue tick, which keeps
/// `can_execute` pure and all queue mutation inside `add`/`remove`/`run`.
///
/// The timeout timer is the other completion source: if the event never
/// arrives it removes the task outright, guaranteeing forward progress.
/// Both sources converge on the queue's idempotent removal, so whichever
/// fires first wins and the second is harmless.
pub struct EventWaitTask {
    core: TaskCore,
    event: String,
    event_seen: Cell<bool>,
    handler: Cell<Option<HandlerId>>,
    timer: Cell<Option<TimerId>>,
    bus: EventBus,
    timers: Rc<dyn TimerService>,
    on_event: Rc<dyn Fn()>,
}

impl EventWaitTask {
    /// Create the task and wire up its bus registration and timeout timer.
    ///
    /// The task is *not* admitted to the queue here; the caller still calls
    /// [`Queue::add`].
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        description: impl Into<String>,
        priority: Priority,
        lock: TransitionLock,
        event: impl Into<String>,
        timeout: Duration,
        bus: EventBus,
        timers: Rc<dyn TimerService>,
        queue: &Queue,
        on_event: Rc<dyn Fn()>,
    ) -> Rc<Self> {
        let event = event.into();
        let task = Rc::new(Self {
            core: TaskCore::new(description, priority, lock),
            event: event.clone(),
            event_seen: Cell::new(false),
            handler: Cell::new(None),
            timer: Cell::new(None),
            bus: bus.clone(),
            timers: Rc::clone(&timers),
            on_event,
        });

        // Bus handler: flip the flag; the next driver tick does the rest.
        let flag_task = Rc::downgrade(&task);
        let handler = bus.register_event(
            &event,
            Rc::new(move || {
                if let Some(task) = flag_task.upgrade() {
                    debug!(task = %task.core.description(), event = %task.event, "awaited event arrived");
                    task.event_seen.set(true);
                }
            }),
        );
        task.handler.set(Some(handler));

        // Timeout: the alternate path to `Removed`.
        let timeout_task = Rc::downgrade(&task);
        let timeout_queue = queue.handle();
        let timer = timers.create(
            timeout,
            false,
            &format!("{event}-timeout"),
            Rc::new(move || {
                let Some(task) = timeout_task.upgrade() else {
                    return;
                };
                if task.core.state() == TaskState::Removed {
                    return;
                }
                warn!(
                    task = %task.core.description(),
                    event = %task.event,
                    "event wait timed out; removing"
                );
                // The task may not be a queue entry yet (e.g. package
                // payload awaiting release); removal must still land.
                if !timeout_queue.remove_id(task.core.id()) {
                    task.mark_removed();
                }
            }),
        );
        task.timer.set(Some(timer));
        timers.start(timer);

        task
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    /// Drop the bus registration and timer. Safe to call more than once.
    fn teardown(&self) {
        if let Some(handler) = self.handler.take() {
            self.bus.unregister_event(&self.event, handler);
        }
        if let Some(timer) = self.timer.take() {
            self.timers.destroy(timer);
        }
    }
}

impl Task for EventWaitTask {
    fn id(&self) -> TaskId {
        self.core.id()
    }

    fn description(&self) -> &str {
        self.core.description()
    }

    fn priority(&self) -> &Priority {
        self.core.priority()
    }

    fn state(&self) -> TaskState {
        self.core.state()
    }

    fn mark_removed(&self) {
        self.teardown();
        self.core.set_removed();
    }

    fn can_execute(&self) -> bool {
        self.core.base_ready() && self.event_seen.get()
    }

    fn execute(&self, queue: &Queue) {
        if !self.core.start() {
            return;
        }
        debug!(task = %self.core.description(), event = %self.event, "running event completion action");
        (self.on_event)();
        queue.remove(self);
    }

    fn contains(&self, key: &MatchKey) -> bool {
        match key {
            MatchKey::Name(name) if name == &self.event => true,
            other => self.core.matches(other),
        }
    }
}
