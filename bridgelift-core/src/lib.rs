//! Core of bridgelift: keeps a local record of Tower Bridge lifts in step
//! with the published schedule.
//!
//! - [`event`] and [`dataset`]: the lift model and the normalized record
//! - [`reconcile`] and [`merge`]: what changed, and the record after applying it
//! - [`cycle`]: one load, fetch, reconcile, save pass over injected
//!   [`store::LiftStore`] and [`source::LiftSource`] implementations
//! - [`ics`] and [`announce`]: outputs built from the record

pub mod announce;
pub mod config;
pub mod cycle;
pub mod dataset;
pub mod error;
pub mod event;
pub mod ics;
pub mod merge;
pub mod reconcile;
pub mod source;
pub mod store;

pub use config::Config;
pub use cycle::{CycleOptions, CyclePlan, CycleSummary, plan_cycle, run_cycle};
pub use dataset::Dataset;
pub use error::{BridgeLiftError, BridgeLiftResult, MalformedEvent};
pub use event::{EventKey, LiftEvent};
pub use reconcile::{Reconciliation, reconcile};
pub use source::{LiftSource, Snapshot, TowerBridgeSource};
pub use store::{JsonStore, LiftStore, RunLock};
