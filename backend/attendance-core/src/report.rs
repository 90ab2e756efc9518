// src/report.rs

use std::io;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::clock_time::format_clock_time;
use crate::error::ScheduleError;
use crate::generator::{EntryDescriptor, SkipRecord};
use crate::schedule::{normalize_day, DayKey, DayOfWeek, ScheduleTemplate};

/// Text shown once a fill run is done.
///
/// ```text
/// Created 18 entries.
///
/// Skipped days:
/// Day 1: Labour Day
/// Day 9: Vacation, Ascension Day
/// ```
pub fn summary_text(created: usize, skipped: &[SkipRecord]) -> String {
    let mut text = format!("Created {} entries.\n\nSkipped days:", created);
    for skip in skipped {
        text.push_str(&format!("\nDay {}: {}", skip.date.day(), skip.reasons.join(", ")));
    }
    text
}

pub fn progress_text(completed: usize, total: usize) -> String {
    format!("Saved entry {} of {}", completed, total)
}

#[derive(Debug, Serialize)]
struct EntryRow {
    date: NaiveDate,
    weekday: &'static str,
    start: String,
    end: String,
    break_minutes: u32,
    worked_minutes: u32,
    tracking_id: u64,
}

impl From<&EntryDescriptor> for EntryRow {
    fn from(entry: &EntryDescriptor) -> Self {
        Self {
            date: entry.date,
            weekday: DayOfWeek::of(entry.date).short_name(),
            start: entry.start_clock_time(),
            end: entry.end_clock_time(),
            break_minutes: entry.break_minutes,
            worked_minutes: entry.worked_minutes(),
            tracking_id: entry.tracking_id,
        }
    }
}

/// Writes the entries as CSV with a header row.
pub fn write_entries_csv<W: io::Write>(
    writer: W,
    entries: &[EntryDescriptor],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(EntryRow::from(entry))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// One line per weekday with the slots the template resolves to.
pub fn template_text(template: &ScheduleTemplate) -> Result<String, ScheduleError> {
    let mut lines = Vec::with_capacity(DayOfWeek::ALL.len());
    for day in DayOfWeek::ALL {
        let slots = normalize_day(DayKey::Day(day), template.resolve_slots(day))?;
        if slots.is_empty() {
            lines.push(format!("{}: -", day.short_name()));
            continue;
        }
        let rendered: Vec<String> = slots
            .iter()
            .map(|slot| {
                let mut text = format!(
                    "{}-{}",
                    format_clock_time(slot.start),
                    format_clock_time(slot.end)
                );
                if slot.break_minutes > 0 {
                    text.push_str(&format!(" (break {} min)", slot.break_minutes));
                }
                text
            })
            .collect();
        lines.push(format!("{}: {}", day.short_name(), rendered.join(", ")));
    }
    Ok(lines.join("\n"))
}
