// src/task/callback.rs

use std::rc::Rc;

use tracing::debug;

use crate::host::TransitionLock;
use crate::priority::Priority;
use crate::queue::Queue;
use crate::task::{MatchKey, Task, TaskCore, TaskId, TaskState};

/// Immediate-callback task: run a closure as soon as the queue selects it.
///
/// The side effect is synchronous and self-contained, so `execute` also
/// removes the task before returning.
pub struct CallbackTask {
    core: TaskCore,
    callback: Rc<dyn Fn()>,
}

impl CallbackTask {
    pub fn new(
        description: impl Into<String>,
        priority: Priority,
        lock: TransitionLock,
        callback: Rc<dyn Fn()>,
    ) -> Rc<Self> {
        Rc::new(Self {
            core: TaskCore::new(description, priority, lock),
            callback,
        })
    }
}

impl Task for CallbackTask {
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
        self.core.set_removed();
    }

    fn can_execute(&self) -> bool {
        self.core.base_ready()
    }

    fn execute(&self, queue: &Queue) {
        if !self.core.start() {
            return;
        }
        debug!(task = %self.core.description(), "running callback");
        (self.callback)();
        queue.remove(self);
    }

    fn contains(&self, key: &MatchKey) -> bool {
        self.core.matches(key)
    }
}
