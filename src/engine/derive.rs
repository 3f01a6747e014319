//! Epic status derivation.
//!
//! An epic's effective status is a pure function of its own stored status and
//! the stored statuses of its direct children. Grandchildren are not visited.

use crate::error::{Error, Result};
use crate::model::{ItemType, Status};

/// Children of one epic, bucketed by stored status.
///
/// `total` is the number of children counted; the six buckets must partition
/// it exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildCounts {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub reviewing: usize,
    pub done: usize,
    pub canceled: usize,
}

impl ChildCounts {
    /// Tally a list of child statuses.
    #[must_use]
    pub fn from_statuses(statuses: &[Status]) -> Self {
        let mut counts = Self::with_total(statuses.len());
        for &status in statuses {
            counts.record(status, 1);
        }
        counts
    }

    /// Empty buckets for `total` children, filled by [`Self::record`].
    #[must_use]
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Add `count` children to the bucket for `status`. `total` is untouched.
    pub fn record(&mut self, status: Status, count: usize) {
        match status {
            Status::Open => self.open += count,
            Status::InProgress => self.in_progress += count,
            Status::Blocked => self.blocked += count,
            Status::Reviewing => self.reviewing += count,
            Status::Done => self.done += count,
            Status::Canceled => self.canceled += count,
        }
    }

    /// Children in a terminal state.
    #[must_use]
    pub const fn resolved(&self) -> usize {
        self.done + self.canceled
    }

    /// Sum of all buckets.
    #[must_use]
    pub const fn bucket_sum(&self) -> usize {
        self.open + self.in_progress + self.blocked + self.reviewing + self.done + self.canceled
    }

    /// Fail if the buckets do not add up to `total`.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` on mismatch.
    pub fn check_partition(&self) -> Result<()> {
        let sum = self.bucket_sum();
        if sum == self.total {
            Ok(())
        } else {
            Err(Error::InvariantViolation(format!(
                "child status partition mismatch: buckets sum to {sum}, total is {}",
                self.total
            )))
        }
    }
}

/// Compute the effective status of an item.
///
/// Tasks return `stored` unchanged. For epics:
///
/// 1. A stored `Done`/`Canceled` is a manual override and wins.
/// 2. No children: `stored` passes through.
/// 3. All children done or canceled: `Done`.
/// 4. Every unresolved child is blocked: `Blocked`.
/// 5. Any child in progress, reviewing or done: `InProgress`.
/// 6. Otherwise `Open`.
///
/// Keep rule 3 in sync with [`super::resolve::DEP_UNRESOLVED_SQL`] and
/// [`super::resolve::is_unresolved`].
///
/// # Errors
///
/// Returns `InvariantViolation` if `children` is not a valid partition.
pub fn derive_status(item_type: ItemType, stored: Status, children: &ChildCounts) -> Result<Status> {
    if item_type == ItemType::Task {
        return Ok(stored);
    }

    if stored.is_terminal() {
        return Ok(stored);
    }

    children.check_partition()?;

    if children.total == 0 {
        return Ok(stored);
    }

    if children.resolved() == children.total {
        return Ok(Status::Done);
    }

    let unresolved = children.total - children.resolved();
    if children.blocked == unresolved {
        return Ok(Status::Blocked);
    }

    if children.in_progress > 0 || children.reviewing > 0 || children.done > 0 {
        return Ok(Status::InProgress);
    }

    Ok(Status::Open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn epic(stored: Status, children: &[Status]) -> Status {
        derive_status(ItemType::Epic, stored, &ChildCounts::from_statuses(children)).unwrap()
    }

    #[test]
    fn test_no_children_reports_stored() {
        assert_eq!(epic(Status::Open, &[]), Status::Open);
    }

    #[test]
    fn test_all_children_done() {
        assert_eq!(epic(Status::Open, &[Status::Done, Status::Done]), Status::Done);
    }

    #[test]
    fn test_done_and_canceled_mix_is_done() {
        assert_eq!(epic(Status::Open, &[Status::Done, Status::Canceled]), Status::Done);
        assert_eq!(epic(Status::Open, &[Status::Canceled]), Status::Done);
    }

    #[test]
    fn test_partial_completion_is_in_progress() {
        assert_eq!(epic(Status::Open, &[Status::Done, Status::Open]), Status::InProgress);
    }

    #[test]
    fn test_all_blocked() {
        assert_eq!(epic(Status::Open, &[Status::Blocked, Status::Blocked]), Status::Blocked);
    }

    #[test]
    fn test_blocked_with_resolved_siblings_is_blocked() {
        assert_eq!(
            epic(Status::Open, &[Status::Blocked, Status::Done, Status::Canceled]),
            Status::Blocked
        );
    }

    #[test]
    fn test_reviewing_child_is_in_progress() {
        assert_eq!(epic(Status::Open, &[Status::Reviewing, Status::Open]), Status::InProgress);
    }

    #[test]
    fn test_blocked_and_open_is_open() {
        assert_eq!(epic(Status::Open, &[Status::Blocked, Status::Open]), Status::Open);
    }

    #[test]
    fn test_all_open() {
        assert_eq!(epic(Status::Open, &[Status::Open, Status::Open]), Status::Open);
    }

    #[test]
    fn test_manual_override_wins() {
        assert_eq!(epic(Status::Canceled, &[Status::Open]), Status::Canceled);
        assert_eq!(epic(Status::Done, &[Status::Blocked]), Status::Done);
    }

    #[test]
    fn test_reopened_child_flips_done_epic_to_in_progress() {
        assert_eq!(epic(Status::Open, &[Status::Done, Status::Done]), Status::Done);
        assert_eq!(epic(Status::Open, &[Status::Open, Status::Done]), Status::InProgress);
    }

    #[test]
    fn test_task_ignores_children() {
        let counts = ChildCounts::from_statuses(&[Status::Done]);
        assert_eq!(
            derive_status(ItemType::Task, Status::Blocked, &counts).unwrap(),
            Status::Blocked
        );
    }

    #[test]
    fn test_partition_mismatch_is_invariant_violation() {
        let counts = ChildCounts {
            total: 3,
            open: 1,
            ..ChildCounts::default()
        };
        let err = derive_status(ItemType::Epic, Status::Open, &counts).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
        assert!(err.is_internal());
    }

    fn status_strategy() -> impl Strategy<Value = Status> {
        prop::sample::select(Status::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

        #[test]
        fn task_effective_equals_stored(
            stored in status_strategy(),
            children in prop::collection::vec(status_strategy(), 0..8),
        ) {
            let counts = ChildCounts::from_statuses(&children);
            prop_assert_eq!(derive_status(ItemType::Task, stored, &counts).unwrap(), stored);
        }

        #[test]
        fn terminal_override_ignores_children(
            stored in prop::sample::select(vec![Status::Done, Status::Canceled]),
            children in prop::collection::vec(status_strategy(), 0..8),
        ) {
            let counts = ChildCounts::from_statuses(&children);
            prop_assert_eq!(derive_status(ItemType::Epic, stored, &counts).unwrap(), stored);
        }

        #[test]
        fn buckets_partition_children(
            children in prop::collection::vec(status_strategy(), 0..16),
        ) {
            let counts = ChildCounts::from_statuses(&children);
            prop_assert_eq!(counts.total, children.len());
            prop_assert_eq!(counts.bucket_sum(), children.len());
            prop_assert!(counts.check_partition().is_ok());
        }
    }
}
