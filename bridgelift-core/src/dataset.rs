//! The authoritative, ordered record of lifts.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::event::{EventKey, LiftEvent};

/// Lifts unique by natural key, sorted ascending by time
/// (ties broken by vessel, then direction).
///
/// Because the sequence is sorted, day and range queries are contiguous
/// slices found by binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LiftEvent>", into = "Vec<LiftEvent>")]
pub struct Dataset {
    events: Vec<LiftEvent>,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset::default()
    }

    /// Build a dataset from arbitrary events, sorting them and collapsing
    /// duplicate keys. The last occurrence of a key wins.
    pub fn from_events(events: impl IntoIterator<Item = LiftEvent>) -> Self {
        let by_key: BTreeMap<EventKey, LiftEvent> =
            events.into_iter().map(|e| (e.key(), e)).collect();

        Dataset {
            events: by_key.into_values().collect(),
        }
    }

    /// True if `events` already satisfies the ordering and uniqueness invariants.
    pub fn is_normalized(events: &[LiftEvent]) -> bool {
        events.windows(2).all(|pair| pair[0] < pair[1])
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LiftEvent> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[LiftEvent] {
        &self.events
    }

    pub fn into_vec(self) -> Vec<LiftEvent> {
        self.events
    }

    pub fn contains_key(&self, key: &EventKey) -> bool {
        self.events
            .binary_search_by(|e| e.key().cmp(key))
            .is_ok()
    }

    /// Lifts with `from <= when < to`.
    pub fn between(&self, from: NaiveDateTime, to: NaiveDateTime) -> &[LiftEvent] {
        if to <= from {
            return &[];
        }
        let start = self.events.partition_point(|e| e.when() < from);
        let end = self.events.partition_point(|e| e.when() < to);
        &self.events[start..end]
    }

    /// Lifts scheduled on the given calendar day.
    pub fn on_day(&self, day: NaiveDate) -> &[LiftEvent] {
        let from = day.and_time(NaiveTime::MIN);
        match day.succ_opt() {
            Some(next) => self.between(from, next.and_time(NaiveTime::MIN)),
            None => {
                let start = self.events.partition_point(|e| e.when() < from);
                &self.events[start..]
            }
        }
    }

    /// Lifts strictly after `now`.
    pub fn upcoming(&self, now: NaiveDateTime) -> &[LiftEvent] {
        let start = self.events.partition_point(|e| e.when() <= now);
        &self.events[start..]
    }
}

impl From<Vec<LiftEvent>> for Dataset {
    fn from(events: Vec<LiftEvent>) -> Self {
        Dataset::from_events(events)
    }
}

impl From<Dataset> for Vec<LiftEvent> {
    fn from(dataset: Dataset) -> Self {
        dataset.events
    }
}

impl FromIterator<LiftEvent> for Dataset {
    fn from_iter<I: IntoIterator<Item = LiftEvent>>(iter: I) -> Self {
        Dataset::from_events(iter)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a LiftEvent;
    type IntoIter = std::slice::Iter<'a, LiftEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
