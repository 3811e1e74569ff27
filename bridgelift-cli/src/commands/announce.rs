use anyhow::Result;
use bridgelift_core::Config;
use bridgelift_core::announce::schedule_for_day;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use super::load_dataset;
use crate::render::Render;

pub fn run(config: &Config, day: Option<NaiveDate>) -> Result<()> {
    let dataset = load_dataset(config)?;
    let now = config.now()?;
    let day = day.unwrap_or(now.date());

    let schedule = schedule_for_day(&dataset, day, now, &config.announce, &mut rand::thread_rng())?;

    if schedule.is_empty() {
        println!("{}", format!("Nothing left to announce for {day}").dimmed());
        return Ok(());
    }

    for (i, announcement) in schedule.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", announcement.render());
    }

    Ok(())
}
