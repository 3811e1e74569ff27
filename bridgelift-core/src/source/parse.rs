//! Parsing of the lift-times HTML page.
//!
//! The page holds a single `div.view-content` containing a table. Each data
//! row has five cells: day name, date ("01 May 2024"), time ("10:00"),
//! vessel and direction.

use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};

use crate::error::{BridgeLiftError, BridgeLiftResult, MalformedEvent};
use crate::event::LiftEvent;
use crate::source::{MalformedRow, Snapshot};

const CELLS_PER_ROW: usize = 5;
const TIMESTAMP_FORMAT: &str = "%d %b %Y %H:%M";

fn selector(css: &str) -> BridgeLiftResult<Selector> {
    Selector::parse(css).map_err(|e| BridgeLiftError::Parse(format!("invalid selector '{css}': {e:?}")))
}

/// Parse the lift-times page into a snapshot.
///
/// Fails only if the page does not have the expected shape. Individual
/// bad rows end up in [`Snapshot::malformed`].
pub fn parse_schedule(html: &str) -> BridgeLiftResult<Snapshot> {
    let document = Html::parse_document(html);

    let content_sel = selector("div.view-content")?;
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let header_sel = selector("th")?;
    let cell_sel = selector("td")?;

    let contents: Vec<ElementRef<'_>> = document.select(&content_sel).collect();
    let [content] = contents.as_slice() else {
        return Err(BridgeLiftError::Parse(format!(
            "expected one content block, found {}",
            contents.len()
        )));
    };

    let table = content
        .select(&table_sel)
        .next()
        .ok_or_else(|| BridgeLiftError::Parse("content block has no table".into()))?;

    let mut snapshot = Snapshot::default();

    let data_rows = table
        .select(&row_sel)
        .filter(|row| row.select(&header_sel).next().is_none());

    for (index, row) in data_rows.enumerate() {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|cell| cell.text().collect::<String>())
            .collect();

        match parse_row(&cells) {
            Ok(event) => snapshot.events.push(event),
            Err(reason) => {
                tracing::warn!(row = index, %reason, "Skipping malformed lift row");
                snapshot.malformed.push(MalformedRow { row: index, reason });
            }
        }
    }

    tracing::debug!(
        lifts = snapshot.events.len(),
        malformed = snapshot.malformed.len(),
        "Parsed lift schedule"
    );

    Ok(snapshot)
}

fn parse_row(cells: &[String]) -> Result<LiftEvent, MalformedEvent> {
    let [_day, date, time, vessel, direction] = cells else {
        return Err(MalformedEvent::CellCount {
            expected: CELLS_PER_ROW,
            found: cells.len(),
        });
    };

    let date = first_line(date).ok_or(MalformedEvent::MissingField("date"))?;
    let time = first_line(time).ok_or(MalformedEvent::MissingField("time"))?;

    let stamp = format!("{date} {time}");
    let when = NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT)
        .map_err(|_| MalformedEvent::BadTimestamp(stamp))?;

    LiftEvent::new(when, vessel, direction)
}

/// Cells sometimes carry extra lines (e.g. a screen-reader label) after the value.
fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body>
<div class="header">Lift times</div>
<div class="view-content">
  <table>
    <thead><tr><th>Day</th><th>Date</th><th>Time</th><th>Vessel</th><th>Direction</th></tr></thead>
    <tbody>{rows}</tbody>
  </table>
</div>
</body></html>"#
        )
    }

    #[test]
    fn test_parse_schedule_reads_rows() {
        let html = page(
            r#"
<tr><td>Wed</td><td>01 May 2024</td><td>10:00</td><td>MV Alpha </td><td>Upstream</td></tr>
<tr><td>Thu</td><td>
02 May 2024
</td><td>17:45</td><td>Paddle Steamer Waverley</td><td>Downstream
</td></tr>"#,
        );

        let snapshot = parse_schedule(&html).unwrap();

        assert!(snapshot.malformed.is_empty());
        assert_eq!(snapshot.events.len(), 2);
        let first = &snapshot.events[0];
        assert_eq!(
            first.when(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(10, 0, 0).unwrap()
        );
        assert_eq!(first.vessel(), "MV Alpha");
        assert_eq!(first.direction(), "Upstream");
        assert_eq!(snapshot.events[1].vessel(), "Paddle Steamer Waverley");
        assert_eq!(snapshot.events[1].direction(), "Downstream");
    }

    #[test]
    fn test_parse_schedule_reports_malformed_rows() {
        let html = page(
            r#"
<tr><td>Wed</td><td>01 May 2024</td><td>10:00</td><td>MV Alpha</td><td>Upstream</td></tr>
<tr><td>Wed</td><td>31 Feb 2024</td><td>10:00</td><td>MV Ghost</td><td>Upstream</td></tr>
<tr><td>Wed</td><td>01 May 2024</td><td>11:00</td><td></td><td>Upstream</td></tr>
<tr><td colspan="5">No further lifts scheduled</td></tr>"#,
        );

        let snapshot = parse_schedule(&html).unwrap();

        assert_eq!(snapshot.events.len(), 1);
        let reasons: Vec<_> = snapshot.malformed.iter().map(|m| (m.row, m.reason.clone())).collect();
        assert_eq!(
            reasons,
            vec![
                (1, MalformedEvent::BadTimestamp("31 Feb 2024 10:00".into())),
                (2, MalformedEvent::MissingField("vessel")),
                (3, MalformedEvent::CellCount { expected: 5, found: 1 }),
            ]
        );
    }

    #[test]
    fn test_parse_schedule_rejects_unexpected_page() {
        let err = parse_schedule("<html><body><p>Maintenance</p></body></html>").unwrap_err();
        assert!(matches!(err, BridgeLiftError::Parse(_)));

        let two = r#"<div class="view-content"><table></table></div><div class="view-content"></div>"#;
        assert!(matches!(parse_schedule(two), Err(BridgeLiftError::Parse(_))));
    }

    #[test]
    fn test_parse_schedule_empty_table_is_empty_snapshot() {
        let snapshot = parse_schedule(&page("")).unwrap();
        assert!(snapshot.events.is_empty());
        assert!(snapshot.malformed.is_empty());
    }
}
