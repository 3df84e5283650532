// src/task/modal.rs

use std::rc::Rc;

use tracing::{debug, warn};

use crate::host::{ContentLoader, PresentationHost, TransitionLock};
use crate::priority::Priority;
use crate::queue::Queue;
use crate::task::{MatchKey, Task, TaskCore, TaskId, TaskState};

/// Content path presented when a dialog key cannot be resolved, or when a
/// resolved path fails to load.
pub const FALLBACK_CONTENT: &str = "dialogs/generic";

/// Modal-presentation task: show a dialog once its content is resolved.
///
/// If the content is already cached, `execute` presents synchronously and
/// self-removes within the same tick. Otherwise it starts an asynchronous
/// fetch and defers removal to the completion callback; load failure
/// presents the generic fallback instead. Both paths converge on removal,
/// so a modal task can never stall the queue.
///
/// Duplicate dialogs are not gated here — callers tag the priority
/// `Singleton` and sweep with [`Queue::remove_duplicates_of`] before
/// admission.
pub struct ModalTask {
    core: TaskCore,
    content: String,
    loader: Rc<dyn ContentLoader>,
    presenter: Rc<dyn PresentationHost>,
}

impl ModalTask {
    /// Build a modal task for `content`.
    ///
    /// Missing data does not fail construction: an unresolved content key
    /// falls back to [`FALLBACK_CONTENT`].
    pub fn new(
        description: impl Into<String>,
        priority: Priority,
        lock: TransitionLock,
        content: Option<String>,
        loader: Rc<dyn ContentLoader>,
        presenter: Rc<dyn PresentationHost>,
    ) -> Rc<Self> {
        let description = description.into();
        let content = match content {
            Some(path) => path,
            None => {
                warn!(
                    task = %description,
                    "no content resolved for dialog; using fallback"
                );
                FALLBACK_CONTENT.to_string()
            }
        };

        Rc::new(Self {
            core: TaskCore::new(description, priority, lock),
            content,
            loader,
            presenter,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Task for ModalTask {
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

        if self.loader.is_cached(&self.content) {
            debug!(task = %self.core.description(), content = %self.content, "content cached; presenting synchronously");
            self.presenter
                .present(&self.content, &crate::host::ContentHandle::new(&self.content));
            queue.remove(self);
            return;
        }

        debug!(task = %self.core.description(), content = %self.content, "content not cached; starting fetch");
        let id = self.core.id();
        let success_queue = queue.handle();
        let failure_queue = queue.handle();
        let success_presenter = Rc::clone(&self.presenter);
        let failure_presenter = Rc::clone(&self.presenter);

        self.loader.load(
            &self.content,
            Box::new(move |path, content| {
                success_presenter.present(path, &content);
                success_queue.remove_id(id);
            }),
            Box::new(move |path| {
                warn!(path = %path, "dialog content failed to load; presenting fallback");
                failure_presenter.present_fallback(path);
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
