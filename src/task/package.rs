// src/task/package.rs

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::host::TransitionLock;
use crate::priority::Priority;
use crate::queue::Queue;
use crate::task::{MatchKey, Task, TaskCore, TaskId, TaskState};

/// Barrier over a fixed set of member tasks.
///
/// Members are inert payload until the package releases them: they are not
/// queue entries, cannot be selected, and only become independently
/// schedulable when every member has individually signalled readiness and
/// the package itself executes. Release is atomic — a strict subset is
/// never promoted.
pub struct Package {
    core: TaskCore,
    members: Vec<Rc<dyn Task>>,
    /// Members known ready for release, in readiness order. Grows
    /// monotonically until it equals `members`.
    completed: RefCell<Vec<Rc<dyn Task>>>,
}

impl Package {
    pub fn new(
        description: impl Into<String>,
        priority: Priority,
        lock: TransitionLock,
        members: Vec<Rc<dyn Task>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            core: TaskCore::new(description, priority, lock),
            members,
            completed: RefCell::new(Vec::new()),
        })
    }

    /// Mark the member matching `key` as ready for release.
    ///
    /// Idempotent per member; keys matching no member are ignored. Returns
    /// whether a member was newly marked.
    pub fn member_ready(&self, key: &MatchKey) -> bool {
        let Some(member) = self.members.iter().find(|m| m.contains(key)) else {
            warn!(package = %self.core.description(), ?key, "readiness signal matches no member; ignoring");
            return false;
        };

        let mut completed = self.completed.borrow_mut();
        if completed.iter().any(|c| c.id() == member.id()) {
            debug!(
                package = %self.core.description(),
                member = %member.description(),
                "member already marked ready"
            );
            return false;
        }

        debug!(
            package = %self.core.description(),
            member = %member.description(),
            ready = completed.len() + 1,
            total = self.members.len(),
            "package member ready"
        );
        completed.push(Rc::clone(member));
        true
    }

    /// True once every member signalled readiness and no modal transition is
    /// in progress. Alias of the task-contract readiness check.
    pub fn is_ready_to_run(&self) -> bool {
        self.can_execute()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.borrow().len()
    }
}

impl Task for Package {
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
        self.core.base_ready() && self.completed.borrow().len() == self.members.len()
    }

    /// Release every member into the queue, highest priority first (stable,
    /// so equal ratings keep readiness order), then self-remove. This is the
    /// only point at which members become queue entries.
    fn execute(&self, queue: &Queue) {
        if !self.core.start() {
            return;
        }

        // A member can die while waiting for the barrier (e.g. an event
        // wait whose timeout fired); release only the live ones.
        let mut release: Vec<Rc<dyn Task>> = self
            .completed
            .borrow()
            .iter()
            .filter(|m| m.state() != TaskState::Removed)
            .cloned()
            .collect();
        release.sort_by(Queue::sort_by_priority);

        info!(
            package = %self.core.description(),
            members = release.len(),
            "releasing package members"
        );
        for member in release {
            queue.add(member);
        }
        queue.remove(self);
    }

    /// True for the package's own identity or, recursively, any member's.
    fn contains(&self, key: &MatchKey) -> bool {
        self.core.matches(key) || self.members.iter().any(|m| m.contains(key))
    }
}
