pub mod announce;
pub mod config;
pub mod export;
pub mod lifts;
pub mod status;
pub mod update;

use bridgelift_core::{Config, Dataset, JsonStore, LiftStore};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub use crate::utils::tui::create_spinner;

fn load_dataset(config: &Config) -> anyhow::Result<Dataset> {
    Ok(JsonStore::new(config.data_path()).load()?)
}

/// Half-open datetime bounds covering `from` through the end of `to`.
/// Missing ends are unbounded.
fn date_bounds(from: Option<NaiveDate>, to: Option<NaiveDate>) -> (NaiveDateTime, NaiveDateTime) {
    let start = from.map_or(NaiveDateTime::MIN, |d| d.and_time(NaiveTime::MIN));
    let end = to
        .and_then(|d| d.succ_opt())
        .map_or(NaiveDateTime::MAX, |d| d.and_time(NaiveTime::MIN));
    (start, end)
}
