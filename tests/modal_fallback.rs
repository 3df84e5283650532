// tests/modal_fallback.rs

use std::rc::Rc;

use showrunner::host::{Affordance, ContentLoader, PresentationHost, TransitionLock};
use showrunner::priority::Priority;
use showrunner::queue::Queue;
use showrunner::task::modal::FALLBACK_CONTENT;
use showrunner::task::{ModalTask, PreloadTask, Task, TaskState};
use showrunner_test_utils::fakes::{FakeLoader, Presented, RecordingPresenter};
use showrunner_test_utils::init_tracing;

struct Stage {
    lock: TransitionLock,
    loader: Rc<FakeLoader>,
    presenter: Rc<RecordingPresenter>,
    queue: Queue,
}

impl Stage {
    fn new() -> Self {
        Self {
            lock: TransitionLock::new(),
            loader: FakeLoader::new(),
            presenter: RecordingPresenter::new(),
            queue: Queue::new(),
        }
    }

    fn modal(&self, name: &str, content: Option<&str>) -> Rc<ModalTask> {
        let task = ModalTask::new(
            name,
            Priority::new(10),
            self.lock.clone(),
            content.map(str::to_string),
            Rc::clone(&self.loader) as Rc<dyn ContentLoader>,
            Rc::clone(&self.presenter) as Rc<dyn PresentationHost>,
        );
        self.queue.add(Rc::clone(&task) as Rc<dyn Task>);
        task
    }

    fn preload(&self, name: &str, content: &str, affordance: &Affordance) -> Rc<PreloadTask> {
        let task = PreloadTask::new(
            name,
            Priority::new(10),
            self.lock.clone(),
            content,
            affordance.clone(),
            Rc::clone(&self.loader) as Rc<dyn ContentLoader>,
        );
        self.queue.add(Rc::clone(&task) as Rc<dyn Task>);
        task
    }
}

#[test]
fn cached_content_presents_synchronously() {
    init_tracing();
    let stage = Stage::new();
    stage.loader.set_cached("dialogs/welcome");
    let task = stage.modal("welcome", Some("dialogs/welcome"));

    assert!(stage.queue.run());
    assert_eq!(
        stage.presenter.shown(),
        vec![Presented::Content { path: "dialogs/welcome".to_string() }]
    );
    assert_eq!(task.state(), TaskState::Removed);
    assert!(stage.queue.is_empty());
    // No fetch was needed.
    assert!(stage.loader.loads_requested().is_empty());
}

#[test]
fn uncached_content_presents_on_load_completion() {
    init_tracing();
    let stage = Stage::new();
    let task = stage.modal("welcome", Some("dialogs/welcome"));

    assert!(stage.queue.run());
    // Fetch in flight: presented nothing yet, still queued, but started.
    assert!(stage.presenter.shown().is_empty());
    assert_eq!(task.state(), TaskState::Started);
    assert_eq!(stage.queue.len(), 1);
    assert_eq!(stage.loader.loads_requested(), vec!["dialogs/welcome".to_string()]);

    // A started task is no longer selectable.
    assert!(!stage.queue.run());

    stage.loader.complete("dialogs/welcome");
    assert_eq!(
        stage.presenter.shown(),
        vec![Presented::Content { path: "dialogs/welcome".to_string() }]
    );
    assert_eq!(task.state(), TaskState::Removed);
    assert!(stage.queue.is_empty());
}

#[test]
fn load_failure_presents_fallback_and_still_removes() {
    init_tracing();
    let stage = Stage::new();
    let task = stage.modal("broken", Some("dialogs/broken"));

    assert!(stage.queue.run());
    stage.loader.fail("dialogs/broken");

    assert_eq!(
        stage.presenter.shown(),
        vec![Presented::Fallback { path: "dialogs/broken".to_string() }]
    );
    assert_eq!(task.state(), TaskState::Removed);
    assert!(stage.queue.is_empty());
}

#[test]
fn missing_content_uses_the_generic_dialog() {
    init_tracing();
    let stage = Stage::new();
    stage.loader.set_cached(FALLBACK_CONTENT);
    let task = stage.modal("mystery", None);

    assert_eq!(task.content(), FALLBACK_CONTENT);
    assert!(stage.queue.run());
    assert_eq!(
        stage.presenter.shown(),
        vec![Presented::Content { path: FALLBACK_CONTENT.to_string() }]
    );
}

#[test]
fn preload_waits_for_its_affordance() {
    init_tracing();
    let stage = Stage::new();
    let affordance = Affordance::new("shop-button", false);
    let task = stage.preload("shop", "bundles/shop", &affordance);

    assert!(!stage.queue.run());
    assert_eq!(task.state(), TaskState::Pending);

    affordance.set_active(true);
    assert!(stage.queue.run());
    assert_eq!(task.state(), TaskState::Started);

    stage.loader.complete("bundles/shop");
    assert_eq!(task.state(), TaskState::Removed);
    assert!(stage.queue.is_empty());
    // Preloads never present anything.
    assert!(stage.presenter.shown().is_empty());
    assert!(stage.loader.is_cached("bundles/shop"));
}

#[test]
fn cached_preload_self_removes_without_fetching() {
    init_tracing();
    let stage = Stage::new();
    stage.loader.set_cached("bundles/shop");
    let affordance = Affordance::new("shop-button", true);
    let task = stage.preload("shop", "bundles/shop", &affordance);

    assert!(stage.queue.run());
    assert_eq!(task.state(), TaskState::Removed);
    assert!(stage.loader.loads_requested().is_empty());
}

#[test]
fn failed_preload_gives_up_quietly() {
    init_tracing();
    let stage = Stage::new();
    let affordance = Affordance::new("shop-button", true);
    let task = stage.preload("shop", "bundles/seasonal", &affordance);

    assert!(stage.queue.run());
    stage.loader.fail("bundles/seasonal");

    assert_eq!(task.state(), TaskState::Removed);
    assert!(stage.queue.is_empty());
    assert!(stage.presenter.shown().is_empty());
    assert!(!stage.loader.is_cached("bundles/seasonal"));
}
