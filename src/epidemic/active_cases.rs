//! The working set of citizens that are visited every day.
//!
//! A day starts with [`ActiveCases::review`], which hands out today's list.
//! Each reviewed case is either retained or dropped, newly exposed citizens
//! are admitted, and [`ActiveCases::commit`] installs the list for the next
//! day: retained cases in their original order followed by the admissions.
//! Citizens admitted today are therefore first visited tomorrow.
use std::vec;

use crate::epidemic::citizen::CitizenId;

#[derive(Debug, Clone, Default)]
pub struct ActiveCases {
    ids: Vec<CitizenId>,
}

impl ActiveCases {
    #[must_use]
    pub fn new() -> ActiveCases {
        ActiveCases::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: CitizenId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CitizenId> {
        self.ids.iter()
    }

    /// Adds a case outside of a daily review (used when seeding).
    pub fn push(&mut self, id: CitizenId) {
        self.ids.push(id);
    }

    /// Takes today's list for review. The tracker is empty until the review
    /// is committed.
    pub fn review(&mut self) -> Review {
        let pending = std::mem::take(&mut self.ids);
        Review {
            retained: Vec::with_capacity(pending.len()),
            pending: pending.into_iter(),
            admitted: Vec::new(),
        }
    }

    /// Installs the list for the next day. Cases never handed out by
    /// `next_case` are kept as if retained.
    pub fn commit(&mut self, review: Review) {
        let Review {
            pending,
            mut retained,
            admitted,
        } = review;
        retained.extend(pending);
        retained.extend(admitted);
        self.ids = retained;
    }
}

#[derive(Debug)]
pub struct Review {
    pending: vec::IntoIter<CitizenId>,
    retained: Vec<CitizenId>,
    admitted: Vec<CitizenId>,
}

impl Review {
    pub fn next_case(&mut self) -> Option<CitizenId> {
        self.pending.next()
    }

    /// Keeps a reviewed case for tomorrow.
    pub fn retain(&mut self, id: CitizenId) {
        self.retained.push(id);
    }

    /// Adds a case that became active today.
    pub fn admit(&mut self, id: CitizenId) {
        debug_assert!(!self.admitted.contains(&id), "{id} admitted twice");
        self.admitted.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> CitizenId {
        CitizenId::new(0, n)
    }

    #[test]
    fn survivors_keep_order_and_new_cases_follow() {
        let mut cases = ActiveCases::new();
        for n in 0..4 {
            cases.push(id(n));
        }

        let mut review = cases.review();
        assert!(cases.is_empty());
        let mut visited = Vec::new();
        while let Some(case) = review.next_case() {
            visited.push(case);
            if case == id(1) {
                review.admit(id(10));
            }
            // Case 2 resolves today
            if case != id(2) {
                review.retain(case);
            }
        }
        cases.commit(review);

        assert_eq!(visited, vec![id(0), id(1), id(2), id(3)]);
        let next: Vec<_> = cases.iter().copied().collect();
        assert_eq!(next, vec![id(0), id(1), id(3), id(10)]);
        assert!(!cases.contains(id(2)));
    }

    #[test]
    fn unvisited_cases_survive_commit() {
        let mut cases = ActiveCases::new();
        cases.push(id(0));
        cases.push(id(1));
        let mut review = cases.review();
        let first = review.next_case().unwrap();
        review.retain(first);
        cases.commit(review);
        assert_eq!(cases.len(), 2);
    }

    #[test]
    fn empty_review_commits_empty_list() {
        let mut cases = ActiveCases::new();
        let mut review = cases.review();
        assert_eq!(review.next_case(), None);
        cases.commit(review);
        assert!(cases.is_empty());
    }
}
