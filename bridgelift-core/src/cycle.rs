//! One load, fetch, reconcile, merge, save pass.
//!
//! The driver holds no business logic. It pins down ordering: nothing is
//! written unless the fetch succeeded and produced at least one lift, and
//! the record is replaced wholesale in a single save.

use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::time::timeout;

use crate::dataset::Dataset;
use crate::error::{BridgeLiftError, BridgeLiftResult};
use crate::merge;
use crate::reconcile::{Reconciliation, reconcile};
use crate::source::{LiftSource, MalformedRow};
use crate::store::LiftStore;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CycleOptions {
    pub fetch_timeout: Duration,
    /// Compute everything but do not save.
    pub dry_run: bool,
}

impl Default for CycleOptions {
    fn default() -> Self {
        CycleOptions {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            dry_run: false,
        }
    }
}

/// Everything a cycle found, before anything is saved.
#[derive(Debug, Clone)]
pub struct CyclePlan {
    pub current: Dataset,
    pub reconciliation: Reconciliation,
    pub updated: Dataset,
    pub malformed: Vec<MalformedRow>,
}

impl CyclePlan {
    pub fn summary(&self, saved: bool) -> CycleSummary {
        CycleSummary {
            before: self.current.len(),
            added: self.reconciliation.added.len(),
            cancelled: self.reconciliation.cancelled.len(),
            kept_as_happened: self.reconciliation.kept_as_happened.len(),
            malformed: self.malformed.len(),
            total: self.updated.len(),
            saved,
        }
    }
}

/// Counts reported after each cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub before: usize,
    pub added: usize,
    pub cancelled: usize,
    pub kept_as_happened: usize,
    pub malformed: usize,
    pub total: usize,
    /// Whether the record was written.
    pub saved: bool,
}

impl CycleSummary {
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.cancelled > 0
    }
}

/// Load, fetch and reconcile without saving anything.
pub async fn plan_cycle<S, F>(
    store: &S,
    source: &F,
    now: NaiveDateTime,
    options: &CycleOptions,
) -> BridgeLiftResult<CyclePlan>
where
    S: LiftStore,
    F: LiftSource,
{
    let current = store.load()?;

    let snapshot = timeout(options.fetch_timeout, source.fetch())
        .await
        .map_err(|_| BridgeLiftError::FetchTimeout(options.fetch_timeout.as_secs()))??;

    if snapshot.events.is_empty() {
        tracing::warn!(
            source = %source.name(),
            malformed = snapshot.malformed.len(),
            "Fetched schedule has no lifts, aborting"
        );
        return Err(BridgeLiftError::EmptySnapshot);
    }

    let reconciliation = reconcile(&current, &snapshot.events, now);
    let updated = merge::apply(&current, &reconciliation);

    Ok(CyclePlan {
        current,
        reconciliation,
        updated,
        malformed: snapshot.malformed,
    })
}

/// Run one reconciliation cycle and persist the result.
///
/// On any error the stored record is left exactly as it was.
pub async fn run_cycle<S, F>(
    store: &S,
    source: &F,
    now: NaiveDateTime,
    options: &CycleOptions,
) -> BridgeLiftResult<(CyclePlan, CycleSummary)>
where
    S: LiftStore,
    F: LiftSource,
{
    let plan = match plan_cycle(store, source, now, options).await {
        Ok(plan) => plan,
        Err(e) => {
            tracing::error!(error = %e, "Update cycle failed, no changes made");
            return Err(e);
        }
    };

    let should_save = !options.dry_run && plan.updated != plan.current;
    if should_save {
        if let Err(e) = store.save(&plan.updated) {
            tracing::error!(error = %e, "Update cycle failed while saving, stored record unchanged");
            return Err(e);
        }
    }

    let summary = plan.summary(should_save);
    tracing::info!(
        before = summary.before,
        added = summary.added,
        cancelled = summary.cancelled,
        kept_as_happened = summary.kept_as_happened,
        malformed = summary.malformed,
        total = summary.total,
        saved = summary.saved,
        "Update cycle complete"
    );

    Ok((plan, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LiftEvent;
    use crate::source::Snapshot;
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    struct MemoryStore {
        data: RefCell<Dataset>,
        saves: Cell<usize>,
    }

    impl MemoryStore {
        fn new(events: Vec<LiftEvent>) -> Self {
            MemoryStore {
                data: RefCell::new(Dataset::from_events(events)),
                saves: Cell::new(0),
            }
        }
    }

    impl LiftStore for MemoryStore {
        fn load(&self) -> BridgeLiftResult<Dataset> {
            Ok(self.data.borrow().clone())
        }

        fn save(&self, dataset: &Dataset) -> BridgeLiftResult<()> {
            *self.data.borrow_mut() = dataset.clone();
            self.saves.set(self.saves.get() + 1);
            Ok(())
        }
    }

    struct ReadOnlyStore(Dataset);

    impl LiftStore for ReadOnlyStore {
        fn load(&self) -> BridgeLiftResult<Dataset> {
            Ok(self.0.clone())
        }

        fn save(&self, _dataset: &Dataset) -> BridgeLiftResult<()> {
            Err(BridgeLiftError::StoreSave {
                path: "lifts.json".into(),
                reason: "disk full".into(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    enum FakeSource {
        Lifts(Vec<LiftEvent>),
        Fails,
        Hangs,
    }

    impl LiftSource for FakeSource {
        fn name(&self) -> String {
            "fake".into()
        }

        async fn fetch(&self) -> BridgeLiftResult<Snapshot> {
            match self {
                FakeSource::Lifts(events) => Ok(Snapshot::new(events.clone())),
                FakeSource::Fails => Err(BridgeLiftError::Fetch("unreachable".into())),
                FakeSource::Hangs => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Snapshot::default())
                }
            }
        }
    }

    fn at(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn lift(day: u32, h: u32, vessel: &str, direction: &str) -> LiftEvent {
        LiftEvent::new(at(day, h), vessel, direction).unwrap()
    }

    #[tokio::test]
    async fn test_run_cycle_saves_merged_dataset() {
        let store = MemoryStore::new(vec![lift(1, 10, "MV Alpha", "up"), lift(2, 9, "MV Beta", "down")]);
        let source = FakeSource::Lifts(vec![lift(1, 10, "MV Alpha", "up"), lift(3, 8, "MV Gamma", "up")]);

        let (_, summary) = run_cycle(&store, &source, at(1, 12), &CycleOptions::default())
            .await
            .unwrap();

        assert_eq!(
            summary,
            CycleSummary {
                before: 2,
                added: 1,
                cancelled: 1,
                kept_as_happened: 0,
                malformed: 0,
                total: 2,
                saved: true,
            }
        );
        let vessels: Vec<_> = store.data.borrow().iter().map(|e| e.vessel().to_string()).collect();
        assert_eq!(vessels, vec!["MV Alpha", "MV Gamma"]);
    }

    #[tokio::test]
    async fn test_run_cycle_without_changes_skips_save() {
        let lifts = vec![lift(1, 10, "MV Alpha", "up")];
        let store = MemoryStore::new(lifts.clone());

        let (_, summary) = run_cycle(&store, &FakeSource::Lifts(lifts), at(1, 0), &CycleOptions::default())
            .await
            .unwrap();

        assert!(!summary.has_changes());
        assert!(!summary.saved);
        assert_eq!(store.saves.get(), 0);
    }

    #[tokio::test]
    async fn test_run_cycle_dry_run_does_not_save() {
        let store = MemoryStore::new(vec![]);
        let source = FakeSource::Lifts(vec![lift(3, 8, "MV Gamma", "up")]);
        let options = CycleOptions {
            dry_run: true,
            ..CycleOptions::default()
        };

        let (plan, summary) = run_cycle(&store, &source, at(1, 0), &options).await.unwrap();

        assert_eq!(summary.added, 1);
        assert!(!summary.saved);
        assert_eq!(plan.updated.len(), 1);
        assert!(store.data.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_run_cycle_aborts_on_empty_snapshot() {
        let store = MemoryStore::new(vec![lift(9, 10, "MV Future", "up")]);

        let err = run_cycle(&store, &FakeSource::Lifts(vec![]), at(1, 0), &CycleOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeLiftError::EmptySnapshot));
        assert_eq!(store.saves.get(), 0);
        assert_eq!(store.data.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_run_cycle_aborts_on_fetch_failure() {
        let store = MemoryStore::new(vec![lift(9, 10, "MV Future", "up")]);

        let err = run_cycle(&store, &FakeSource::Fails, at(1, 0), &CycleOptions::default())
            .await
            .unwrap_err();

        assert!(err.is_fetch_failure());
        assert_eq!(store.saves.get(), 0);
    }

    #[tokio::test]
    async fn test_run_cycle_logs_save_failure() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let store = ReadOnlyStore(Dataset::new());
        let source = FakeSource::Lifts(vec![lift(3, 8, "MV Gamma", "up")]);

        let err = run_cycle(&store, &source, at(1, 0), &CycleOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeLiftError::StoreSave { .. }));
        let logs = logs.contents();
        assert!(logs.contains("ERROR"), "logs:\n{logs}");
        assert!(logs.contains("disk full"), "logs:\n{logs}");
        assert!(!logs.contains("Update cycle complete"), "logs:\n{logs}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cycle_times_out_slow_fetch() {
        let store = MemoryStore::new(vec![]);
        let options = CycleOptions {
            fetch_timeout: Duration::from_secs(5),
            dry_run: false,
        };

        let err = run_cycle(&store, &FakeSource::Hangs, at(1, 0), &options)
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeLiftError::FetchTimeout(5)));
        assert_eq!(store.saves.get(), 0);
    }
}
