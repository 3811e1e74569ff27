//! Lift event types.
//!
//! A lift is identified entirely by its natural key: the scheduled time,
//! the vessel it lifts for and the direction of travel. There is no
//! provider-assigned id; two rows with the same key are the same lift.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::MalformedEvent;

/// A single scheduled bridge lift.
///
/// Fields are private so every value in circulation has passed
/// [`LiftEvent::new`]: minute precision, trimmed non-empty text fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawLift")]
pub struct LiftEvent {
    when: NaiveDateTime,
    vessel: String,
    direction: String,
}

/// Identity of a lift: (when, vessel, direction).
///
/// Ordering is by time first, then vessel, then direction, which is also
/// the dataset ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub when: NaiveDateTime,
    pub vessel: String,
    pub direction: String,
}

/// Unvalidated lift fields, as read from the web page or the data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLift {
    pub when: NaiveDateTime,
    pub vessel: String,
    pub direction: String,
}

impl LiftEvent {
    pub fn new(
        when: NaiveDateTime,
        vessel: impl AsRef<str>,
        direction: impl AsRef<str>,
    ) -> Result<Self, MalformedEvent> {
        let vessel = vessel.as_ref().trim();
        let direction = direction.as_ref().trim();

        if vessel.is_empty() {
            return Err(MalformedEvent::MissingField("vessel"));
        }
        if direction.is_empty() {
            return Err(MalformedEvent::MissingField("direction"));
        }

        Ok(LiftEvent {
            when: truncate_to_minute(when),
            vessel: vessel.to_string(),
            direction: direction.to_string(),
        })
    }

    pub fn when(&self) -> NaiveDateTime {
        self.when
    }

    pub fn vessel(&self) -> &str {
        &self.vessel
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }

    pub fn key(&self) -> EventKey {
        EventKey {
            when: self.when,
            vessel: self.vessel.clone(),
            direction: self.direction.clone(),
        }
    }

    /// Format the lift time for display (e.g. "Wed 01 May 10:00").
    pub fn render_time(&self) -> String {
        self.when.format("%a %d %b %H:%M").to_string()
    }
}

impl TryFrom<RawLift> for LiftEvent {
    type Error = MalformedEvent;

    fn try_from(raw: RawLift) -> Result<Self, Self::Error> {
        LiftEvent::new(raw.when, raw.vessel, raw.direction)
    }
}

impl From<&LiftEvent> for RawLift {
    fn from(event: &LiftEvent) -> Self {
        RawLift {
            when: event.when,
            vessel: event.vessel.clone(),
            direction: event.direction.clone(),
        }
    }
}

impl fmt::Display for LiftEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.vessel, self.direction)
    }
}

fn truncate_to_minute(when: NaiveDateTime) -> NaiveDateTime {
    when.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(when)
}
