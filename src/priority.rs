// src/priority.rs

//! Composable urgency values attached to every scheduled task.
//!
//! A [`Priority`] is a numeric rating plus a monotone set of tags. Tags are
//! layered onto the rating via [`Priority::add_to_rating`] and queried with
//! [`Priority::is_type`]; once added, a tag is never removed for the lifetime
//! of the value.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;

use serde::Deserialize;

/// Markers layered onto a priority rating.
///
/// - `Low` / `Immediate` shift the rating; `Immediate` strictly outranks `Low`.
/// - `Singleton` carries no weight; it activates the queue's dedup sweep.
/// - `Stack` carries no weight; it marks presentations that stack on top of
///   whatever is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTag {
    Low,
    Immediate,
    Singleton,
    Stack,
}

impl PriorityTag {
    /// Fixed weight contributed to the rating when the tag is added.
    ///
    /// Only the relative order matters to callers; the constants live here so
    /// there is exactly one place to tune them.
    pub fn weight(self) -> i64 {
        match self {
            PriorityTag::Immediate => 1000,
            PriorityTag::Low => 10,
            PriorityTag::Singleton | PriorityTag::Stack => 0,
        }
    }
}

impl FromStr for PriorityTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(PriorityTag::Low),
            "immediate" => Ok(PriorityTag::Immediate),
            "singleton" => Ok(PriorityTag::Singleton),
            "stack" => Ok(PriorityTag::Stack),
            other => Err(format!(
                "invalid priority tag: {other} (expected \"low\", \"immediate\", \"singleton\" or \"stack\")"
            )),
        }
    }
}

/// Urgency of a task: a rating plus the tags that were layered onto it.
#[derive(Debug, Clone, Default)]
pub struct Priority {
    rating: i64,
    tags: HashSet<PriorityTag>,
}

impl Priority {
    /// A priority with a caller-chosen base rating and no tags.
    pub fn new(base_rating: i64) -> Self {
        Self {
            rating: base_rating,
            tags: HashSet::new(),
        }
    }

    /// Convenience constructor: base rating plus a set of tags.
    pub fn with_tags(base_rating: i64, tags: &[PriorityTag]) -> Self {
        let mut priority = Self::new(base_rating);
        for &tag in tags {
            priority.add_to_rating(tag);
        }
        priority
    }

    /// Add a tag's weight to the rating and record the tag as present.
    ///
    /// Idempotent: re-adding a tag marks it present but does not add its
    /// weight a second time, so repeated tagging cannot reorder unrelated
    /// comparisons.
    pub fn add_to_rating(&mut self, tag: PriorityTag) {
        if self.tags.insert(tag) {
            self.rating += tag.weight();
        }
    }

    /// Side-effect-free membership test: was this tag ever added?
    pub fn is_type(&self, tag: PriorityTag) -> bool {
        self.tags.contains(&tag)
    }

    /// The current numeric rating. Higher runs first.
    pub fn rating(&self) -> i64 {
        self.rating
    }

    /// Ordering used for task selection: rating descending.
    ///
    /// Equal ratings compare as `Equal`; the queue and package release both
    /// use stable ordering over insertion order, so ties resolve FIFO.
    pub fn compare(a: &Priority, b: &Priority) -> Ordering {
        b.rating.cmp(&a.rating)
    }
}
