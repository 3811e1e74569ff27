use std::path::PathBuf;

use anyhow::Result;
use bridgelift_core::Config;
use bridgelift_core::ics::generate_calendar;
use chrono::{NaiveDate, Utc};

use super::{date_bounds, load_dataset};

pub fn run(
    config: &Config,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    output: Option<PathBuf>,
) -> Result<()> {
    let dataset = load_dataset(config)?;
    let (start, end) = date_bounds(from, to);
    let lifts = dataset.between(start, end);

    let ics = generate_calendar(lifts, &config.calendar, config.timezone()?, Utc::now())?;

    match output {
        Some(path) => {
            std::fs::write(&path, ics)?;
            eprintln!("Wrote {} lifts to {}", lifts.len(), path.display());
        }
        None => print!("{ics}"),
    }

    Ok(())
}
