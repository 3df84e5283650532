// src/host/mod.rs

//! Capability interfaces the scheduler core consumes from the host client.
//!
//! The scheduler never implements downloading, rendering, clocks, or server
//! event delivery itself; it only talks to these seams:
//!
//! - [`ContentLoader`] — asset/bundle resolution with async callbacks.
//! - [`PresentationHost`] — actually showing resolved content (synchronous
//!   from the task's point of view).
//! - [`TimerService`] — named timers with expiry callbacks.
//! - [`EventBus`] — named server/client events (see [`bus`]).
//! - [`TransitionLock`] — the global modal-transition flag checked by every
//!   task's base readiness.
//! - [`Affordance`] — the active/inactive UI element a preload task is
//!   attached to.
//!
//! The implementations in [`loader`], [`timers`] and [`presenter`] are the
//! simulated hosts used by the demo driver; tests use the fakes from
//! `showrunner-test-utils`.

pub mod bus;
pub mod loader;
pub mod presenter;
pub mod timers;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

pub use bus::{EventBus, HandlerId};
pub use loader::SimLoader;
pub use presenter::TracingPresenter;
pub use timers::{TimerId, TokioTimers};

/// Opaque handle to resolved content, delivered by a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHandle {
    path: String,
}

impl ContentHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// One-shot success callback: `(path, content)`.
pub type LoadSuccess = Box<dyn FnOnce(&str, ContentHandle)>;
/// One-shot failure callback: `(path)`.
pub type LoadFailure = Box<dyn FnOnce(&str)>;

/// Asset/bundle resolution seam used by the modal and preload tasks.
pub trait ContentLoader {
    /// Whether the content behind `path` is already resolved locally.
    fn is_cached(&self, path: &str) -> bool;

    /// Start resolving `path`. Exactly one of the two callbacks fires later
    /// (or synchronously, if the implementation can resolve immediately).
    fn load(&self, path: &str, on_success: LoadSuccess, on_failure: LoadFailure);
}

/// Display seam invoked by the modal task once content is resolved.
///
/// Invocation is synchronous from the task's point of view; whatever
/// animation the host runs afterwards is not the scheduler's concern.
pub trait PresentationHost {
    fn present(&self, path: &str, content: &ContentHandle);

    /// Degraded path: show generic substitute content for `path`.
    fn present_fallback(&self, path: &str);
}

/// Expiry callback invoked when a timer fires.
pub type TimerCallback = Rc<dyn Fn()>;

/// Named-timer seam. Internals of the clock source are out of scope; the
/// scheduler only creates, starts, stops, and destroys handles.
pub trait TimerService {
    fn create(
        &self,
        duration: Duration,
        repeating: bool,
        name: &str,
        on_expire: TimerCallback,
    ) -> TimerId;

    fn start(&self, id: TimerId);

    fn stop(&self, id: TimerId);

    fn destroy(&self, id: TimerId);
}

/// Global modal-transition flag.
///
/// While held, no task passes its base readiness check. Cheap to clone; all
/// clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct TransitionLock {
    held: Rc<Cell<bool>>,
}

impl TransitionLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_transitioning(&self) -> bool {
        self.held.get()
    }

    pub fn set_transitioning(&self, held: bool) {
        self.held.set(held);
    }
}

/// A named UI affordance (e.g. a shop button) a preload task is gated on.
///
/// The preload task is only ready while the affordance is active. Clones
/// share the flag, so the host can toggle it from outside.
#[derive(Debug, Clone)]
pub struct Affordance {
    name: String,
    active: Rc<Cell<bool>>,
}

impl Affordance {
    pub fn new(name: impl Into<String>, active: bool) -> Self {
        Self {
            name: name.into(),
            active: Rc::new(Cell::new(active)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn set_active(&self, active: bool) {
        self.active.set(active);
    }
}
