//! TUI rendering traits for bridgelift types.
//!
//! Extension traits that add colored terminal rendering to bridgelift-core
//! types using owo_colors.

use bridgelift_core::announce::Announcement;
use bridgelift_core::source::MalformedRow;
use bridgelift_core::{CycleSummary, LiftEvent, Reconciliation};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for LiftEvent {
    fn render(&self) -> String {
        format!("{} {}", self.render_time().dimmed(), self)
    }
}

impl Render for Announcement {
    fn render(&self) -> String {
        let mut lines = vec![format!("📣 {}", self.at.format("%H:%M").bold())];
        lines.extend(self.text.lines().map(|l| format!("   {l}")));
        lines.join("\n")
    }
}

impl Render for MalformedRow {
    fn render(&self) -> String {
        format!("   {} row {}: {}", "!".yellow(), self.row, self.reason)
    }
}

impl Render for CycleSummary {
    fn render(&self) -> String {
        let mut line = format!(
            "{} added, {} cancelled, {} kept as happened; {} {} stored",
            self.added,
            self.cancelled,
            self.kept_as_happened,
            self.total,
            pluralize("lift", self.total)
        );
        if self.malformed > 0 {
            line.push_str(&format!(", {} malformed {} skipped", self.malformed, pluralize("row", self.malformed)));
        }
        line
    }
}

/// Threshold for compact view (show counts instead of individual lifts)
const COMPACT_THRESHOLD: usize = 5;

fn render_change_list(
    lifts: &[LiftEvent],
    symbol: &str,
    label: &str,
    colorize: fn(&str) -> String,
    verbose: bool,
    lines: &mut Vec<String>,
) {
    if lifts.is_empty() {
        return;
    }

    if verbose || lifts.len() <= COMPACT_THRESHOLD {
        for lift in lifts {
            lines.push(format!(
                "   {} {} {}",
                colorize(symbol),
                colorize(&lift.to_string()),
                lift.render_time().dimmed()
            ));
        }
    } else {
        let text = format!("({} {} {})", lifts.len(), label, pluralize("lift", lifts.len()));
        lines.push(format!("   {} {}", colorize(symbol), colorize(&text)));
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Changes found by a cycle, grouped by kind.
pub trait ReconciliationRender {
    fn render(&self, verbose: bool) -> String;
}

impl ReconciliationRender for Reconciliation {
    fn render(&self, verbose: bool) -> String {
        if self.is_empty() && self.kept_as_happened.is_empty() {
            return "   No changes".dimmed().to_string();
        }

        let mut lines = Vec::new();
        render_change_list(&self.added, "+", "new", |s| s.green().to_string(), verbose, &mut lines);
        render_change_list(&self.cancelled, "-", "cancelled", |s| s.red().to_string(), verbose, &mut lines);
        render_change_list(
            &self.kept_as_happened,
            "✓",
            "past",
            |s| s.dimmed().to_string(),
            verbose,
            &mut lines,
        );
        lines.join("\n")
    }
}
