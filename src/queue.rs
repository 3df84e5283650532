// src/queue.rs

//! The scheduler proper: a single admission queue of pending tasks.
//!
//! The queue holds every pending [`Task`] (packages included — a package is
//! just another variant), selects the highest-priority ready entry on each
//! driver tick, and offers the dedup and existence queries tasks use to
//! coordinate with each other.
//!
//! Everything here is single-threaded and cooperative. `entries` is only
//! mutated inside `add`, `remove`, and `run`; `run` operates on a snapshot,
//! so a task's `execute` may re-enter `add`/`remove` (directly or from an
//! asynchronous callback) without upsetting selection.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::priority::{Priority, PriorityTag};
use crate::task::{MatchKey, Task, TaskId, TaskState};

/// How much work a single `run` call performs.
///
/// - `Single` (default): execute at most the one top-ranked ready entry.
///   Bounds per-tick work and keeps re-entered runs strictly ordered.
/// - `Drain`: keep selecting until no entry is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickPolicy {
    Single,
    Drain,
}

impl Default for TickPolicy {
    fn default() -> Self {
        TickPolicy::Single
    }
}

impl FromStr for TickPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(TickPolicy::Single),
            "drain" => Ok(TickPolicy::Drain),
            other => Err(format!(
                "invalid tick_policy: {other} (expected \"single\" or \"drain\")"
            )),
        }
    }
}

struct QueueInner {
    /// Insertion order is preserved and is the FIFO tie-break for selection.
    entries: Vec<Rc<dyn Task>>,
    policy: TickPolicy,
}

/// Cheap-to-clone handle to the shared queue state.
///
/// Clones share the same entries; the queue is constructed once by the host
/// and injected into collaborators.
#[derive(Clone)]
pub struct Queue {
    inner: Rc<RefCell<QueueInner>>,
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Queue {
    pub fn new() -> Self {
        Self::with_policy(TickPolicy::default())
    }

    pub fn with_policy(policy: TickPolicy) -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueInner {
                entries: Vec::new(),
                policy,
            })),
        }
    }

    /// Weak handle for task callbacks; avoids `Rc` cycles between the queue
    /// and the entries it owns.
    pub fn handle(&self) -> QueueHandle {
        QueueHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Admit a task at the end of the queue.
    ///
    /// Already-removed tasks are refused and duplicate ids are ignored, so
    /// re-adding a queued task is a no-op.
    pub fn add(&self, task: Rc<dyn Task>) {
        if task.state() == TaskState::Removed {
            warn!(task = %task.description(), "refusing to queue a removed task");
            return;
        }

        let mut inner = self.inner.borrow_mut();
        if inner.entries.iter().any(|e| e.id() == task.id()) {
            debug!(task = %task.description(), "task already queued; ignoring add");
            return;
        }

        debug!(
            task = %task.description(),
            rating = task.priority().rating(),
            "queued task"
        );
        inner.entries.push(task);
    }

    /// Remove a task: mark it `Removed` and erase it from the entries.
    /// Idempotent; removing an absent task is a no-op.
    pub fn remove(&self, task: &dyn Task) -> bool {
        self.remove_id(task.id())
    }

    /// Remove by id. Returns whether an entry was actually erased.
    pub fn remove_id(&self, id: TaskId) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            inner
                .entries
                .iter()
                .position(|e| e.id() == id)
                .map(|pos| inner.entries.remove(pos))
        };

        match removed {
            Some(entry) => {
                // Marking happens outside the borrow: teardown in
                // mark_removed may touch timers or the event bus.
                entry.mark_removed();
                debug!(task = %entry.description(), "removed task from queue");
                true
            }
            None => false,
        }
    }

    /// Remove every entry other than `task` that matches `key` and carries
    /// the `Singleton` tag. Callers invoke this immediately before admitting
    /// or selecting a singleton task, guaranteeing at most one live instance
    /// per match key. Returns how many duplicates were swept.
    pub fn remove_duplicates_of(&self, task: &dyn Task, key: &MatchKey) -> usize {
        let duplicates: Vec<Rc<dyn Task>> = {
            let inner = self.inner.borrow();
            inner
                .entries
                .iter()
                .filter(|e| {
                    e.id() != task.id()
                        && e.priority().is_type(PriorityTag::Singleton)
                        && e.contains(key)
                })
                .cloned()
                .collect()
        };

        for duplicate in &duplicates {
            debug!(
                task = %duplicate.description(),
                ?key,
                "sweeping duplicate singleton"
            );
            self.remove_id(duplicate.id());
        }
        duplicates.len()
    }

    /// Existence query over `contains`: is any queued entry matching `key`?
    pub fn has_task_with(&self, key: &MatchKey) -> bool {
        self.inner.borrow().entries.iter().any(|e| e.contains(key))
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// One driver tick.
    ///
    /// Selects the ready entry with the maximum rating (FIFO on ties) and
    /// executes it. Under the default `Single` policy at most one entry
    /// progresses per call; `Drain` repeats until nothing is ready. Returns
    /// whether anything executed.
    pub fn run(&self) -> bool {
        let policy = self.inner.borrow().policy;
        match policy {
            TickPolicy::Single => self.run_one(),
            TickPolicy::Drain => {
                let mut ran_any = false;
                while self.run_one() {
                    ran_any = true;
                }
                ran_any
            }
        }
    }

    fn run_one(&self) -> bool {
        // Selection works on a borrowed view, but execution happens after
        // the borrow is released so the task may mutate the queue.
        let selected: Option<Rc<dyn Task>> = {
            let inner = self.inner.borrow();
            let mut best: Option<&Rc<dyn Task>> = None;
            for entry in &inner.entries {
                if entry.state() == TaskState::Removed || !entry.can_execute() {
                    continue;
                }
                match best {
                    Some(current) if entry.priority().rating() <= current.priority().rating() => {}
                    _ => best = Some(entry),
                }
            }
            best.cloned()
        };

        match selected {
            Some(task) => {
                debug!(
                    task = %task.description(),
                    rating = task.priority().rating(),
                    "executing task"
                );
                task.execute(self);
                true
            }
            None => false,
        }
    }

    /// The comparator used for selection, exposed so collaborators (e.g. a
    /// package releasing its members) produce a consistent order. Stable
    /// sorts keep insertion order on ties.
    pub fn sort_by_priority(a: &Rc<dyn Task>, b: &Rc<dyn Task>) -> Ordering {
        Priority::compare(a.priority(), b.priority())
    }
}

/// Weak form of [`Queue`] captured by asynchronous task callbacks.
///
/// Degrades to a no-op once the queue itself has been torn down, so a late
/// load or timer callback cannot touch freed state.
#[derive(Clone)]
pub struct QueueHandle {
    inner: Weak<RefCell<QueueInner>>,
}

impl QueueHandle {
    pub fn remove_id(&self, id: TaskId) -> bool {
        match self.inner.upgrade() {
            Some(inner) => Queue { inner }.remove_id(id),
            None => false,
        }
    }
}
