// src/task/mod.rs

//! The closed family of deferred-work variants.
//!
//! Every unit of deferred work in the client — run a callback, present a
//! modal, preload a bundle, wait for a named event, release a batch — is one
//! of the variants in this module. They all share one contract ([`Task`]):
//! a pure readiness predicate, an execution action, and a match test used
//! for dedup and existence queries.
//!
//! Shared plumbing (identity, priority, state, the transition-lock check)
//! lives in the composed [`TaskCore`] record rather than in inheritance.

pub mod callback;
pub mod event;
pub mod modal;
pub mod package;
pub mod preload;

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::host::TransitionLock;
use crate::priority::Priority;
use crate::queue::Queue;

pub use callback::CallbackTask;
pub use event::EventWaitTask;
pub use modal::ModalTask;
pub use package::Package;
pub use preload::PreloadTask;

/// Unique identity of a task, assigned at construction.
pub type TaskId = u64;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed)
}

/// Lifecycle of a single task.
///
/// `Pending` until the first successful `execute`, `Started` once the side
/// effect has fired (possibly still awaiting an asynchronous outcome), and
/// `Removed` once taken out of the queue. `Removed` is terminal; no
/// transition re-enters `Pending` or `Started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Started,
    Removed,
}

/// Opaque identity value compared by [`Task::contains`].
///
/// Lets unrelated tasks coordinate through the queue without holding direct
/// references to each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKey {
    /// Matches a task's human-readable description.
    Name(String),
    /// Matches the content path a modal/preload task resolves.
    Content(String),
    /// Matches a specific task instance.
    Id(TaskId),
}

impl MatchKey {
    pub fn name(name: impl Into<String>) -> Self {
        MatchKey::Name(name.into())
    }

    pub fn content(path: impl Into<String>) -> Self {
        MatchKey::Content(path.into())
    }
}

/// Contract shared by every variant.
///
/// Tasks are single-threaded `Rc` values; state transitions go through
/// interior mutability so the queue can hold them as trait objects.
pub trait Task {
    fn id(&self) -> TaskId;

    /// Human-readable identity; also the default match key.
    fn description(&self) -> &str;

    fn priority(&self) -> &Priority;

    fn state(&self) -> TaskState;

    /// Transition to `Removed`. Called by the queue when the task is erased;
    /// variants holding external registrations tear them down here.
    fn mark_removed(&self);

    /// Pure readiness predicate; callable any number of times without side
    /// effects and must not mutate queue state.
    fn can_execute(&self) -> bool;

    /// Fire the side effect. Only invoked by the queue when `can_execute`
    /// was true at selection time; a second call is a no-op.
    fn execute(&self, queue: &Queue);

    /// Identity/membership test against this task's match keys.
    fn contains(&self, key: &MatchKey) -> bool;
}

/// Shared plumbing composed into every variant.
#[derive(Debug)]
pub struct TaskCore {
    id: TaskId,
    description: String,
    priority: Priority,
    state: Cell<TaskState>,
    lock: TransitionLock,
}

impl TaskCore {
    pub fn new(description: impl Into<String>, priority: Priority, lock: TransitionLock) -> Self {
        Self {
            id: next_task_id(),
            description: description.into(),
            priority,
            state: Cell::new(TaskState::Pending),
            lock,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> &Priority {
        &self.priority
    }

    pub fn state(&self) -> TaskState {
        self.state.get()
    }

    /// Base readiness rule shared by all variants: still pending, and no
    /// modal transition in progress.
    pub fn base_ready(&self) -> bool {
        self.state.get() == TaskState::Pending && !self.lock.is_transitioning()
    }

    /// `Pending -> Started`. Returns false if the task already ran or was
    /// removed, which makes repeated `execute` calls no-ops.
    pub fn start(&self) -> bool {
        if self.state.get() == TaskState::Pending {
            self.state.set(TaskState::Started);
            true
        } else {
            false
        }
    }

    pub fn set_removed(&self) {
        self.state.set(TaskState::Removed);
    }

    /// Match test against the keys every variant shares: description and id.
    pub fn matches(&self, key: &MatchKey) -> bool {
        match key {
            MatchKey::Name(name) => name == &self.description,
            MatchKey::Id(id) => *id == self.id,
            MatchKey::Content(_) => false,
        }
    }
}
