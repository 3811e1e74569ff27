//! Where candidate lift schedules come from.
//!
//! A source returns a [`Snapshot`]: every lift currently listed, plus the
//! rows that could not be turned into lifts. Malformed rows are reported,
//! never silently dropped, so they cannot masquerade as cancellations.

mod parse;
mod towerbridge;

pub use parse::parse_schedule;
pub use towerbridge::{DEFAULT_URL, TowerBridgeSource};

use std::future::Future;

use crate::error::{BridgeLiftResult, MalformedEvent};
use crate::event::LiftEvent;

/// One fetch of the published schedule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub events: Vec<LiftEvent>,
    pub malformed: Vec<MalformedRow>,
}

impl Snapshot {
    pub fn new(events: Vec<LiftEvent>) -> Self {
        Snapshot {
            events,
            malformed: Vec::new(),
        }
    }
}

/// A listing row that was rejected before reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRow {
    /// Zero-based position among the data rows of the listing.
    pub row: usize,
    pub reason: MalformedEvent,
}

/// Produces the candidate schedule for a reconciliation cycle.
pub trait LiftSource {
    /// Human-readable name used in logs (e.g. the URL).
    fn name(&self) -> String;

    fn fetch(&self) -> impl Future<Output = BridgeLiftResult<Snapshot>> + Send;
}
