use anyhow::Result;
use bridgelift_core::{Config, LiftEvent};
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use super::{date_bounds, load_dataset};
use crate::render::Render;

pub fn run(
    config: &Config,
    day: Option<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let dataset = load_dataset(config)?;

    let lifts: &[LiftEvent] = match (day, from, to) {
        (Some(day), _, _) => dataset.on_day(day),
        (None, None, None) => dataset.upcoming(config.now()?),
        (None, from, to) => {
            let (start, end) = date_bounds(from, to);
            dataset.between(start, end)
        }
    };

    if lifts.is_empty() {
        println!("{}", "No lifts".dimmed());
        return Ok(());
    }

    for lift in lifts {
        println!("{}", lift.render());
    }

    Ok(())
}
