//! Deterministic fakes for the host capability seams.
//!
//! Unlike the simulated hosts in the main crate, nothing here spawns or
//! sleeps: tests drive every completion by hand (`FakeLoader::complete`,
//! `ManualTimers::fire`), so queue behaviour is fully synchronous and
//! repeatable.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use showrunner::host::timers::TimerId;
use showrunner::host::{
    ContentHandle, ContentLoader, LoadFailure, LoadSuccess, PresentationHost, TimerCallback,
    TimerService,
};

struct PendingLoad {
    on_success: LoadSuccess,
    on_failure: LoadFailure,
}

/// Content loader whose loads only resolve when a test says so.
#[derive(Default)]
pub struct FakeLoader {
    cached: RefCell<HashSet<String>>,
    pending: RefCell<HashMap<String, Vec<PendingLoad>>>,
    requested: RefCell<Vec<String>>,
}

impl FakeLoader {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Pretend `path` is already resolved locally.
    pub fn set_cached(&self, path: &str) {
        self.cached.borrow_mut().insert(path.to_string());
    }

    /// Resolve every pending load of `path` successfully (and cache it).
    pub fn complete(&self, path: &str) {
        let Some(waiters) = self.pending.borrow_mut().remove(path) else {
            return;
        };
        self.cached.borrow_mut().insert(path.to_string());
        for waiter in waiters {
            (waiter.on_success)(path, ContentHandle::new(path));
        }
    }

    /// Fail every pending load of `path`.
    pub fn fail(&self, path: &str) {
        let Some(waiters) = self.pending.borrow_mut().remove(path) else {
            return;
        };
        for waiter in waiters {
            (waiter.on_failure)(path);
        }
    }

    /// Every path `load` was called for, in order (repeats included).
    pub fn loads_requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().values().map(Vec::len).sum()
    }
}

impl ContentLoader for FakeLoader {
    fn is_cached(&self, path: &str) -> bool {
        self.cached.borrow().contains(path)
    }

    fn load(&self, path: &str, on_success: LoadSuccess, on_failure: LoadFailure) {
        self.requested.borrow_mut().push(path.to_string());
        self.pending
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push(PendingLoad {
                on_success,
                on_failure,
            });
    }
}

/// What a [`RecordingPresenter`] was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presented {
    Content { path: String },
    Fallback { path: String },
}

/// Presentation host that records calls instead of rendering.
#[derive(Default)]
pub struct RecordingPresenter {
    shown: RefCell<Vec<Presented>>,
}

impl RecordingPresenter {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn shown(&self) -> Vec<Presented> {
        self.shown.borrow().clone()
    }
}

impl PresentationHost for RecordingPresenter {
    fn present(&self, path: &str, _content: &ContentHandle) {
        self.shown.borrow_mut().push(Presented::Content {
            path: path.to_string(),
        });
    }

    fn present_fallback(&self, path: &str) {
        self.shown.borrow_mut().push(Presented::Fallback {
            path: path.to_string(),
        });
    }
}

struct FakeTimer {
    name: String,
    callback: TimerCallback,
    running: bool,
}

/// Timer host with a hand crank: nothing expires until `fire` is called.
#[derive(Default)]
pub struct ManualTimers {
    inner: RefCell<ManualTimersInner>,
}

#[derive(Default)]
struct ManualTimersInner {
    timers: HashMap<TimerId, FakeTimer>,
    next_id: TimerId,
}

impl ManualTimers {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Run the callback of timer `id` as if it had expired.
    pub fn fire(&self, id: TimerId) {
        let callback = {
            let inner = self.inner.borrow();
            inner.timers.get(&id).map(|t| Rc::clone(&t.callback))
        };
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Fire the first timer whose name matches; panics if none does.
    pub fn fire_by_name(&self, name: &str) {
        let callback = {
            let inner = self.inner.borrow();
            inner
                .timers
                .values()
                .find(|t| t.name == name)
                .map(|t| Rc::clone(&t.callback))
        };
        match callback {
            Some(callback) => callback(),
            None => panic!("no timer named {name:?}"),
        }
    }

    pub fn exists(&self, id: TimerId) -> bool {
        self.inner.borrow().timers.contains_key(&id)
    }

    pub fn is_running(&self, id: TimerId) -> bool {
        self.inner
            .borrow()
            .timers
            .get(&id)
            .is_some_and(|t| t.running)
    }

    pub fn timer_count(&self) -> usize {
        self.inner.borrow().timers.len()
    }
}

impl TimerService for ManualTimers {
    fn create(
        &self,
        _duration: Duration,
        _repeating: bool,
        name: &str,
        on_expire: TimerCallback,
    ) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.timers.insert(
            id,
            FakeTimer {
                name: name.to_string(),
                callback: on_expire,
                running: false,
            },
        );
        id
    }

    fn start(&self, id: TimerId) {
        if let Some(timer) = self.inner.borrow_mut().timers.get_mut(&id) {
            timer.running = true;
        }
    }

    fn stop(&self, id: TimerId) {
        if let Some(timer) = self.inner.borrow_mut().timers.get_mut(&id) {
            timer.running = false;
        }
    }

    fn destroy(&self, id: TimerId) {
        self.inner.borrow_mut().timers.remove(&id);
    }
}
