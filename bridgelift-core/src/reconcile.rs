//! Reconciliation of the stored lift record against a fresh snapshot.
//!
//! The published schedule only ever lists upcoming lifts, so a lift that
//! drops out of the listing is ambiguous. If its time has passed it is
//! assumed to have happened and is kept. If it is still in the future it
//! was pulled by the operator and counts as cancelled.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use crate::dataset::Dataset;
use crate::event::{EventKey, LiftEvent};

/// The partitions produced by [`reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// In the snapshot but not in the record, in snapshot order.
    pub added: Vec<LiftEvent>,
    /// Gone from the snapshot with a time at or before `now`.
    pub kept_as_happened: Vec<LiftEvent>,
    /// Gone from the snapshot with a time after `now`.
    pub cancelled: Vec<LiftEvent>,
}

impl Reconciliation {
    /// True if applying this result would not change the record.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.cancelled.is_empty()
    }
}

/// Compare the stored record with a candidate snapshot.
///
/// Lifts present on both sides are left alone; identity is the natural
/// key only. Duplicate keys in `candidate` are reported once.
pub fn reconcile(
    current: &Dataset,
    candidate: &[LiftEvent],
    now: NaiveDateTime,
) -> Reconciliation {
    let current_by_key: HashMap<EventKey, &LiftEvent> =
        current.iter().map(|e| (e.key(), e)).collect();

    let candidate_keys: HashSet<EventKey> = candidate.iter().map(LiftEvent::key).collect();

    // Snapshot lifts not yet recorded
    let mut seen = HashSet::new();
    let added = candidate
        .iter()
        .filter(|e| {
            let key = e.key();
            !current_by_key.contains_key(&key) && seen.insert(key)
        })
        .cloned()
        .collect();

    // Recorded lifts no longer listed, split by whether they are in the past
    let (kept_as_happened, cancelled): (Vec<_>, Vec<_>) = current
        .iter()
        .filter(|e| !candidate_keys.contains(&e.key()))
        .cloned()
        .partition(|e| e.when() <= now);

    Reconciliation {
        added,
        kept_as_happened,
        cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn lift(day: u32, h: u32, vessel: &str, direction: &str) -> LiftEvent {
        LiftEvent::new(at(day, h), vessel, direction).unwrap()
    }

    fn alpha() -> LiftEvent {
        lift(1, 10, "MV Alpha", "up")
    }

    fn beta() -> LiftEvent {
        lift(2, 9, "MV Beta", "down")
    }

    fn gamma() -> LiftEvent {
        lift(3, 8, "MV Gamma", "up")
    }

    #[test]
    fn test_reconcile_detects_addition_and_future_cancellation() {
        let current = Dataset::from_events(vec![alpha(), beta()]);
        let candidate = vec![alpha(), gamma()];

        let result = reconcile(&current, &candidate, at(1, 12));

        assert_eq!(result.added, vec![gamma()]);
        assert_eq!(result.cancelled, vec![beta()]);
        assert!(result.kept_as_happened.is_empty());
    }

    #[test]
    fn test_reconcile_keeps_vanished_past_lifts() {
        let current = Dataset::from_events(vec![alpha(), beta()]);
        let candidate = vec![gamma()];

        let result = reconcile(&current, &candidate, at(1, 12));

        assert_eq!(result.kept_as_happened, vec![alpha()]);
        assert_eq!(result.cancelled, vec![beta()]);
    }

    #[test]
    fn test_reconcile_lift_at_now_counts_as_happened() {
        let current = Dataset::from_events(vec![alpha()]);

        let result = reconcile(&current, &[gamma()], alpha().when());

        assert_eq!(result.kept_as_happened, vec![alpha()]);
        assert!(result.cancelled.is_empty());
    }

    #[test]
    fn test_reconcile_first_run_adds_everything() {
        let candidate = vec![gamma(), alpha(), beta()];

        let result = reconcile(&Dataset::new(), &candidate, at(1, 12));

        assert_eq!(result.added, candidate);
        assert!(result.cancelled.is_empty());
        assert!(result.kept_as_happened.is_empty());
    }

    #[test]
    fn test_reconcile_identical_inputs_is_empty() {
        let current = Dataset::from_events(vec![alpha(), beta(), gamma()]);

        let result = reconcile(&current, current.as_slice(), at(2, 9));

        assert!(result.is_empty());
        assert!(result.kept_as_happened.is_empty());
    }

    #[test]
    fn test_reconcile_reports_duplicate_candidates_once() {
        let candidate = vec![gamma(), gamma(), alpha(), gamma()];

        let result = reconcile(&Dataset::new(), &candidate, at(1, 12));

        assert_eq!(result.added, vec![gamma(), alpha()]);
    }

    #[test]
    fn test_reconcile_changed_direction_is_a_different_lift() {
        let current = Dataset::from_events(vec![beta()]);
        let candidate = vec![lift(2, 9, "MV Beta", "up")];

        let result = reconcile(&current, &candidate, at(1, 12));

        assert_eq!(result.added, candidate);
        assert_eq!(result.cancelled, vec![beta()]);
    }

    #[test]
    fn test_reconcile_partitions_every_key_exactly_once() {
        let current = Dataset::from_events(vec![
            lift(1, 8, "A", "up"),
            lift(1, 9, "B", "down"),
            lift(2, 8, "C", "up"),
            lift(3, 8, "D", "down"),
        ]);
        let candidate = vec![lift(1, 9, "B", "down"), lift(3, 8, "D", "down"), lift(4, 8, "E", "up")];
        let now = at(1, 12);

        let result = reconcile(&current, &candidate, now);
        let candidate_keys: HashSet<_> = candidate.iter().map(LiftEvent::key).collect();

        for event in &current {
            let retained = candidate_keys.contains(&event.key());
            let happened = result.kept_as_happened.contains(event);
            let cancelled = result.cancelled.contains(event);
            assert_eq!(
                [retained, happened, cancelled].iter().filter(|b| **b).count(),
                1,
                "{event:?} classified more or less than once"
            );
            if !retained {
                assert_eq!(cancelled, event.when() > now);
            }
        }

        for event in &candidate {
            let present = current.contains_key(&event.key());
            assert_ne!(present, result.added.contains(event));
        }
    }
}
