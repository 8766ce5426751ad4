//! A priority queue that stores arbitrary data sorted by time
//!
//! Defines a `Queue<T, P>` that stores items of type `T`, called 'plans',
//! ordered by `f64` time and then by a priority `P`. The `Context` uses it to
//! hold the callbacks that make up a run, such as the daily step and the
//! end-of-day reports. Adding and retrieving a plan are both *O*(log(*n*)).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A priority queue that stores arbitrary data sorted by time
///
/// If two plans are scheduled for the same time the plan with the lower
/// priority runs first; ties on both time and priority go to the plan added
/// first.
pub struct Queue<T, P: Eq + PartialEq + Ord> {
    queue: BinaryHeap<Entry<T, P>>,
    plan_counter: u64,
}

impl<T, P: Eq + PartialEq + Ord> Queue<T, P> {
    #[must_use]
    pub fn new() -> Queue<T, P> {
        Queue {
            queue: BinaryHeap::new(),
            plan_counter: 0,
        }
    }

    /// Add a plan to the queue at the specified time
    pub fn add_plan(&mut self, time: f64, data: T, priority: P) {
        self.queue.push(Entry {
            time,
            id: self.plan_counter,
            priority,
            data,
        });
        self.plan_counter += 1;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Retrieve the earliest plan in the queue, or `None` if it is empty
    pub fn get_next_plan(&mut self) -> Option<Plan<T>> {
        self.queue.pop().map(|entry| Plan {
            time: entry.time,
            data: entry.data,
        })
    }
}

impl<T, P: Eq + PartialEq + Ord> Default for Queue<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

struct Entry<T, P: Eq + PartialEq + Ord> {
    time: f64,
    id: u64,
    priority: P,
    data: T,
}

// The payload takes no part in the ordering; `id` is unique per queue.
impl<T, P: Eq + PartialEq + Ord> PartialEq for Entry<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T, P: Eq + PartialEq + Ord> Eq for Entry<T, P> {}

impl<T, P: Eq + PartialEq + Ord> PartialOrd for Entry<T, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Entries are ordered in increasing order by time, priority, and then plan
/// id. `BinaryHeap` is a max-heap, hence the reversal.
impl<T, P: Eq + PartialEq + Ord> Ord for Entry<T, P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.priority.cmp(&other.priority))
            .then_with(|| self.id.cmp(&other.id))
            .reverse()
    }
}

/// A plan that holds data of type `T` intended to be used at the specified time
pub struct Plan<T> {
    pub time: f64,
    pub data: T,
}
