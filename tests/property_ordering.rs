// tests/property_ordering.rs

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use showrunner::host::TransitionLock;
use showrunner::priority::Priority;
use showrunner::queue::{Queue, TickPolicy};
use showrunner::task::CallbackTask;

/// Drain order must equal a stable descending sort of the ratings:
/// strictly higher ratings first, ties in admission order.
fn expected_order(ratings: &[i64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..ratings.len()).collect();
    indices.sort_by(|&a, &b| ratings[b].cmp(&ratings[a]));
    indices
}

fn drain_order(ratings: &[i64], policy: TickPolicy) -> Vec<usize> {
    let lock = TransitionLock::new();
    let queue = Queue::with_policy(policy);
    let log: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));

    for (index, &rating) in ratings.iter().enumerate() {
        let log = Rc::clone(&log);
        queue.add(CallbackTask::new(
            format!("task-{index}"),
            Priority::new(rating),
            lock.clone(),
            Rc::new(move || log.borrow_mut().push(index)),
        ));
    }

    while queue.run() {}
    Rc::try_unwrap(log).expect("no outstanding callbacks").into_inner()
}

proptest! {
    #[test]
    fn drain_respects_priority_order(
        ratings in proptest::collection::vec(-1000i64..1000, 0..40)
    ) {
        let order = drain_order(&ratings, TickPolicy::Drain);
        prop_assert_eq!(order, expected_order(&ratings));
    }

    #[test]
    fn single_ticks_agree_with_drain(
        ratings in proptest::collection::vec(-1000i64..1000, 0..40)
    ) {
        let single = drain_order(&ratings, TickPolicy::Single);
        let drain = drain_order(&ratings, TickPolicy::Drain);
        prop_assert_eq!(single, drain);
    }

    #[test]
    fn every_admitted_task_eventually_runs(
        ratings in proptest::collection::vec(-1000i64..1000, 0..40)
    ) {
        let order = drain_order(&ratings, TickPolicy::Drain);
        prop_assert_eq!(order.len(), ratings.len());
    }
}
