//! Applying a reconciliation result to the stored record.

use std::collections::{BTreeMap, HashSet};

use crate::dataset::Dataset;
use crate::event::{EventKey, LiftEvent};
use crate::reconcile::Reconciliation;

/// Produce the updated record: drop `cancelled`, add `added`, then
/// dedupe by key and sort. `current` is left untouched.
///
/// If an added lift collides with a surviving key, the added one wins.
pub fn merge(current: &Dataset, added: &[LiftEvent], cancelled: &[LiftEvent]) -> Dataset {
    let cancelled_keys: HashSet<EventKey> = cancelled.iter().map(LiftEvent::key).collect();

    let mut by_key: BTreeMap<EventKey, LiftEvent> = current
        .iter()
        .filter(|e| !cancelled_keys.contains(&e.key()))
        .map(|e| (e.key(), e.clone()))
        .collect();

    for event in added {
        by_key.insert(event.key(), event.clone());
    }

    Dataset::from_events(by_key.into_values())
}

/// Shorthand for [`merge`] with the parts of a [`Reconciliation`].
pub fn apply(current: &Dataset, reconciliation: &Reconciliation) -> Dataset {
    merge(current, &reconciliation.added, &reconciliation.cancelled)
}
