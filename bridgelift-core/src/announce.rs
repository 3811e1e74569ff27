//! Announcement texts for upcoming lifts.
//!
//! Two kinds of post: a morning summary for each day, and a notice shortly
//! before each lift. This module only produces the schedule; posting it is
//! someone else's job.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::AnnounceSettings;
use crate::dataset::Dataset;
use crate::error::{BridgeLiftError, BridgeLiftResult};
use crate::event::LiftEvent;

const HASHTAGS_PER_POST: usize = 2;

/// A post and when it should go out (schedule-local time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub at: NaiveDateTime,
    pub text: String,
}

/// Morning summary for `day`. `lifts` are that day's lifts.
pub fn daily_summary<R: Rng + ?Sized>(
    day: NaiveDate,
    lifts: &[LiftEvent],
    settings: &AnnounceSettings,
    rng: &mut R,
) -> BridgeLiftResult<Announcement> {
    let at = day.and_time(settings.daily_time()?);

    // Two vessels through one lift share a time; count lifts, not rows
    let times: BTreeSet<NaiveTime> = lifts.iter().map(|l| l.when().time()).collect();
    let times: Vec<String> = times.iter().map(|t| t.format("%H:%M").to_string()).collect();

    let text = match times.as_slice() {
        [] => "No lifts today folks :(\n\n#ABoyGottaRest".to_string(),
        [only] => format!(
            "{}.\nTower Bridge will lift 1 time today, at {only}.{}",
            day.format("%Y-%m-%d"),
            footer("#TowerBridge #London #MorningReport", settings, rng)
        ),
        [init @ .., last] => format!(
            "{}.\nTower Bridge will lift {} times today, at {} & {last}.{}",
            day.format("%Y-%m-%d"),
            times.len(),
            init.join(", "),
            footer("#TowerBridge #London #MorningReport", settings, rng)
        ),
    };

    Ok(Announcement { at, text })
}

/// Notice posted `minutes_before` a lift.
pub fn lift_notice<R: Rng + ?Sized>(
    lift: &LiftEvent,
    settings: &AnnounceSettings,
    rng: &mut R,
) -> BridgeLiftResult<Announcement> {
    let at = Duration::try_minutes(settings.minutes_before)
        .and_then(|lead| lift.when().checked_sub_signed(lead))
        .ok_or_else(|| {
            BridgeLiftError::Config(format!(
                "announce.minutes_before {} is out of range",
                settings.minutes_before
            ))
        })?;

    let text = format!(
        "Tower Bridge will lift at {} to allow {} to travel {}. Enjoy the show!{}",
        lift.when().format("%H:%M"),
        lift.vessel(),
        lift.direction().to_lowercase(),
        footer("#TowerBridge #London", settings, rng)
    );

    Ok(Announcement { at, text })
}

/// Summary plus per-lift notices for one day, excluding anything due at
/// or before `now`, ordered by send time.
pub fn schedule_for_day<R: Rng + ?Sized>(
    dataset: &Dataset,
    day: NaiveDate,
    now: NaiveDateTime,
    settings: &AnnounceSettings,
    rng: &mut R,
) -> BridgeLiftResult<Vec<Announcement>> {
    let lifts = dataset.on_day(day);

    let mut schedule = vec![daily_summary(day, lifts, settings, rng)?];
    for lift in lifts {
        schedule.push(lift_notice(lift, settings, rng)?);
    }

    let skipped = schedule.iter().filter(|a| a.at <= now).count();
    if skipped > 0 {
        tracing::debug!(%day, skipped, "Skipping announcements already due");
    }

    schedule.retain(|a| a.at > now);
    schedule.sort_by_key(|a| a.at);
    Ok(schedule)
}

/// [`schedule_for_day`] for every day from `first` to `last` inclusive.
pub fn schedule_for_days<R: Rng + ?Sized>(
    dataset: &Dataset,
    first: NaiveDate,
    last: NaiveDate,
    now: NaiveDateTime,
    settings: &AnnounceSettings,
    rng: &mut R,
) -> BridgeLiftResult<Vec<Announcement>> {
    let mut schedule = Vec::new();
    for day in first.iter_days().take_while(|d| *d <= last) {
        schedule.extend(schedule_for_day(dataset, day, now, settings, rng)?);
    }
    Ok(schedule)
}

fn footer<R: Rng + ?Sized>(fixed: &str, settings: &AnnounceSettings, rng: &mut R) -> String {
    let picked: Vec<&str> = settings
        .hashtags
        .choose_multiple(rng, HASHTAGS_PER_POST)
        .map(String::as_str)
        .collect();

    if picked.is_empty() {
        format!("\n\n{fixed}")
    } else {
        format!("\n\n{fixed} {}", picked.join(" "))
    }
}
