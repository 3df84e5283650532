// src/task/preload.rs

use std::rc::Rc;

use tracing::{debug, warn};

use crate::host::{Affordance, ContentLoader, TransitionLock};
use crate::priority::Priority;
use crate::queue::Queue;
use crate::task::{MatchKey, Task, TaskCore, TaskId, TaskState};

/// Bundle-preload gate: warm the cache for content behind a UI affordance.
///
/// The task is only ready while its affordance (say, a shop button) is
/// active — there is no point preloading a bundle the player cannot reach.
/// Nothing is presented: if the content is already cached the task
/// self-removes immediately, otherwise it starts the fetch and removes
/// itself from either completion callback.
pub struct PreloadTask {
    core: TaskCore,
    content: String,
    affordance: Affordance,
    loader: Rc<dyn ContentLoader>,
}

impl PreloadTask {
    pub fn new(
        description: impl Into<String>,
        priority: Priority,
        lock: TransitionLock,
        content: impl Into<String>,
        affordance: Affordance,
        loader: Rc<dyn ContentLoader>,
    ) -> Rc<Self> {
        Rc::new(Self {
            core: TaskCore::new(description, priority, lock),
            content: content.into(),
            affordance,
            loader,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Task for PreloadTask {
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
        self.core.base_ready() && self.affordance.is_active()
    }

    fn execute(&self, queue: &Queue) {
        if !self.core.start() {
            return;
        }

        if self.loader.is_cached(&self.content) {
            debug!(task = %self.core.description(), content = %self.content, "bundle already cached");
            queue.remove(self);
            return;
        }

        debug!(
            task = %self.core.description(),
            content = %self.content,
            affordance = %self.affordance.name(),
            "preloading bundle"
        );
        let id = self.core.id();
        let success_queue = queue.handle();
        let failure_queue = queue.handle();

        self.loader.load(
            &self.content,
            Box::new(move |path, _content| {
                debug!(path = %path, "bundle preloaded");
                success_queue.remove_id(id);
            }),
            Box::new(move |path| {
                warn!(path = %path, "bundle preload failed; giving up");
                failure_queue.remove_id(id);
            }),
        );
    }

    fn contains(&self, key: &MatchKey) -> bool {
        match key {
            MatchKey::Content(path) => path == &self.content,
            other => self.core.matches(other),
        }
    }
}
