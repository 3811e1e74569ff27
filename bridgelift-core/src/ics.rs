//! ICS export of the lift record.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, EventLike};

use crate::config::CalendarSettings;
use crate::error::{BridgeLiftError, BridgeLiftResult};
use crate::event::LiftEvent;

const PRODID: &str = "-//bridgelift//lift times//EN";

/// Generate a VCALENDAR with one VEVENT per lift.
///
/// Lift times are wall-clock times in `tz`; they are written as UTC.
/// `generated` becomes every event's DTSTAMP, so output is reproducible.
pub fn generate_calendar(
    lifts: &[LiftEvent],
    settings: &CalendarSettings,
    tz: Tz,
    generated: DateTime<Utc>,
) -> BridgeLiftResult<String> {
    let mut cal = Calendar::new();
    cal.name(&settings.name);

    let dtstamp = format_utc(generated);

    for lift in lifts {
        let start = to_utc(lift.when(), tz)?;
        let end = Duration::try_minutes(settings.duration_minutes)
            .and_then(|length| start.checked_add_signed(length))
            .ok_or_else(|| {
                BridgeLiftError::Ics(format!(
                    "duration of {} minutes is out of range",
                    settings.duration_minutes
                ))
            })?;

        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&uid_for(lift));
        ics_event.summary(&settings.summary);
        ics_event.location(&settings.location);
        ics_event.description(&describe(lift));
        ics_event.add_property("DTSTAMP", &dtstamp);
        ics_event.add_property("DTSTART", format_utc(start));
        ics_event.add_property("DTEND", format_utc(end));

        cal.push(ics_event.done());
    }

    let cal = cal.done();
    Ok(replace_prodid(&cal.to_string()))
}

/// Stable UID derived from the natural key, so repeated exports of the same
/// lift update rather than duplicate it in calendar clients.
///
/// Fields are percent-encoded, which escapes the `:` and `@` delimiters, so
/// distinct keys never share a UID.
pub fn uid_for(lift: &LiftEvent) -> String {
    format!(
        "{}:{}:{}@bridgelift",
        lift.when().format("%Y%m%dT%H%M"),
        urlencoding::encode(lift.vessel()),
        urlencoding::encode(lift.direction())
    )
}

pub fn describe(lift: &LiftEvent) -> String {
    format!(
        "Tower Bridge will lift to allow {} to travel {}.",
        lift.vessel(),
        lift.direction()
    )
}

/// Resolve a local wall-clock time. Ambiguous times (clocks going back)
/// take the earlier instant; times in the spring-forward gap are an error.
fn to_utc(when: NaiveDateTime, tz: Tz) -> BridgeLiftResult<DateTime<Utc>> {
    tz.from_local_datetime(&when)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| BridgeLiftError::Ics(format!("{when} does not exist in {}", tz.name())))
}

fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn replace_prodid(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
        } else {
            result.push_str(line);
        }
        result.push_str("\r\n");
    }

    result
}
