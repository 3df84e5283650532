// tests/priority_selection.rs

use std::cell::RefCell;
use std::rc::Rc;

use showrunner::host::TransitionLock;
use showrunner::priority::{Priority, PriorityTag};
use showrunner::queue::{Queue, TickPolicy};
use showrunner::task::{CallbackTask, Task, TaskState};
use showrunner_test_utils::init_tracing;

/// A callback task that appends its name to a shared execution log.
fn recording_task(
    name: &str,
    priority: Priority,
    lock: &TransitionLock,
    log: &Rc<RefCell<Vec<String>>>,
) -> Rc<CallbackTask> {
    let log = Rc::clone(log);
    let entry = name.to_string();
    CallbackTask::new(
        name,
        priority,
        lock.clone(),
        Rc::new(move || log.borrow_mut().push(entry.clone())),
    )
}

#[test]
fn highest_rating_runs_first() {
    init_tracing();
    let lock = TransitionLock::new();
    let queue = Queue::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    queue.add(recording_task("low", Priority::new(10), &lock, &log));
    queue.add(recording_task("high", Priority::new(90), &lock, &log));
    queue.add(recording_task("mid", Priority::new(50), &lock, &log));

    while queue.run() {}

    assert_eq!(*log.borrow(), vec!["high", "mid", "low"]);
    assert!(queue.is_empty());
}

#[test]
fn equal_ratings_resolve_fifo() {
    init_tracing();
    let lock = TransitionLock::new();
    let queue = Queue::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    queue.add(recording_task("first", Priority::new(5), &lock, &log));
    queue.add(recording_task("second", Priority::new(5), &lock, &log));
    queue.add(recording_task("third", Priority::new(5), &lock, &log));

    while queue.run() {}

    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn single_policy_runs_at_most_one_per_tick() {
    init_tracing();
    let lock = TransitionLock::new();
    let queue = Queue::with_policy(TickPolicy::Single);
    let log = Rc::new(RefCell::new(Vec::new()));

    queue.add(recording_task("a", Priority::new(1), &lock, &log));
    queue.add(recording_task("b", Priority::new(2), &lock, &log));

    assert!(queue.run());
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(queue.len(), 1);

    assert!(queue.run());
    assert_eq!(log.borrow().len(), 2);
    assert!(!queue.run());
}

#[test]
fn drain_policy_runs_everything_in_order() {
    init_tracing();
    let lock = TransitionLock::new();
    let queue = Queue::with_policy(TickPolicy::Drain);
    let log = Rc::new(RefCell::new(Vec::new()));

    queue.add(recording_task("b", Priority::new(2), &lock, &log));
    queue.add(recording_task("c", Priority::new(1), &lock, &log));
    queue.add(recording_task("a", Priority::new(3), &lock, &log));

    assert!(queue.run());

    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    assert!(queue.is_empty());
}

#[test]
fn transition_lock_blocks_all_selection() {
    init_tracing();
    let lock = TransitionLock::new();
    let queue = Queue::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    queue.add(recording_task("blocked", Priority::new(99), &lock, &log));

    lock.set_transitioning(true);
    assert!(!queue.run());
    assert!(log.borrow().is_empty());
    assert_eq!(queue.len(), 1);

    lock.set_transitioning(false);
    assert!(queue.run());
    assert_eq!(*log.borrow(), vec!["blocked"]);
}

#[test]
fn execute_is_single_shot() {
    init_tracing();
    let lock = TransitionLock::new();
    let queue = Queue::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let task = recording_task("once", Priority::new(1), &lock, &log);
    queue.add(Rc::clone(&task) as Rc<dyn Task>);

    assert!(queue.run());
    assert_eq!(task.state(), TaskState::Removed);

    // Direct second call must be a no-op.
    task.execute(&queue);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn removed_tasks_are_refused_and_duplicates_ignored() {
    init_tracing();
    let lock = TransitionLock::new();
    let queue = Queue::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let task = recording_task("t", Priority::new(1), &lock, &log);
    queue.add(Rc::clone(&task) as Rc<dyn Task>);
    queue.add(Rc::clone(&task) as Rc<dyn Task>);
    assert_eq!(queue.len(), 1);

    assert!(queue.remove(task.as_ref()));
    assert!(!queue.remove(task.as_ref()));
    assert_eq!(task.state(), TaskState::Removed);

    // Once removed, a task can never come back.
    queue.add(Rc::clone(&task) as Rc<dyn Task>);
    assert!(queue.is_empty());
}

#[test]
fn immediate_tag_outranks_low_tag() {
    let immediate = Priority::with_tags(0, &[PriorityTag::Immediate]);
    let low = Priority::with_tags(0, &[PriorityTag::Low]);
    let plain = Priority::new(0);

    assert!(immediate.rating() > low.rating());
    assert!(low.rating() > plain.rating());
    assert!(immediate.is_type(PriorityTag::Immediate));
    assert!(!immediate.is_type(PriorityTag::Low));
}

#[test]
fn tag_weight_is_applied_once() {
    let mut priority = Priority::new(100);
    priority.add_to_rating(PriorityTag::Immediate);
    let after_first = priority.rating();
    priority.add_to_rating(PriorityTag::Immediate);
    assert_eq!(priority.rating(), after_first);
}

#[test]
fn singleton_and_stack_tags_carry_no_weight() {
    let tagged = Priority::with_tags(42, &[PriorityTag::Singleton, PriorityTag::Stack]);
    assert_eq!(tagged.rating(), 42);
    assert!(tagged.is_type(PriorityTag::Singleton));
    assert!(tagged.is_type(PriorityTag::Stack));
}
