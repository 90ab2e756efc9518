// src/generator.rs

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock_time::format_clock_time;
use crate::date_range::DateRange;
use crate::error::{ScheduleError, ValidationError};
use crate::exceptions::{reasons_for_day, ExceptionInterval};
use crate::jitter::{JitterPlan, JitterSource};
use crate::schedule::{normalize_day, DayKey, DayOfWeek, ScheduleTemplate};

/// One attendance entry to be written remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDescriptor {
    pub date: NaiveDate,
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub break_minutes: u32,
    /// Position of this entry within one generation run, starting at 1.
    pub tracking_id: u64,
}

impl EntryDescriptor {
    pub fn start_clock_time(&self) -> String {
        format_clock_time(self.start_minutes)
    }

    pub fn end_clock_time(&self) -> String {
        format_clock_time(self.end_minutes)
    }

    /// Minutes actually worked (span minus break).
    pub fn worked_minutes(&self) -> u32 {
        self.end_minutes
            .saturating_sub(self.start_minutes)
            .saturating_sub(self.break_minutes)
    }
}

/// A scheduled day that was left empty because of one or more exceptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipRecord {
    pub date: NaiveDate,
    pub reasons: Vec<String>,
}

impl fmt::Display for SkipRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.date, self.reasons.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    pub entries: Vec<EntryDescriptor>,
    pub skipped: Vec<SkipRecord>,
}

/// Walks `range` day by day and produces the entries the template asks for.
///
/// Days without slots are left out silently. Days covered by an exception
/// become a [`SkipRecord`]. Any slot that fails to parse or breaks the slot
/// invariants aborts the whole run.
pub fn generate<J: JitterSource + ?Sized>(
    template: &ScheduleTemplate,
    exceptions: &[ExceptionInterval],
    range: &DateRange,
    entropy_minutes: u32,
    jitter: &mut J,
) -> Result<Generation, ScheduleError> {
    let mut generation = Generation::default();
    let mut tracking_id: u64 = 0;

    for day in range.days() {
        let weekday = DayOfWeek::of(day);
        let (key, slots) = template.resolve(weekday);
        if slots.is_empty() {
            continue;
        }

        let reasons = reasons_for_day(exceptions, day);
        if !reasons.is_empty() {
            debug!("Skipping {} ({}): {}", day, weekday, reasons.join(", "));
            generation.skipped.push(SkipRecord { date: day, reasons });
            continue;
        }

        let normalized = normalize_day(key, slots)?;
        let plan = JitterPlan::draw(jitter, entropy_minutes, normalized.len());

        let mut previous_end: Option<u32> = None;
        for (index, slot) in normalized.iter().enumerate() {
            let (start_minutes, end_minutes) = plan.apply(slot, index);
            if let Some(prev) = previous_end {
                if start_minutes < prev {
                    warn!(
                        "Jittered slot {} on {} starts at {} before the previous slot ends at {}",
                        index,
                        day,
                        format_clock_time(start_minutes),
                        format_clock_time(prev)
                    );
                }
            }
            previous_end = Some(end_minutes);

            tracking_id += 1;
            generation.entries.push(EntryDescriptor {
                date: day,
                start_minutes,
                end_minutes,
                break_minutes: slot.break_minutes,
                tracking_id,
            });
        }
    }

    debug!(
        "Generated {} entries and {} skipped days for {}",
        generation.entries.len(),
        generation.skipped.len(),
        range
    );
    Ok(generation)
}

/// Entries for one date taken verbatim from the template, without jitter or
/// exception checks. `key` picks the slot list by name; without it the
/// date's weekday resolves as usual.
pub fn named_day_entries(
    template: &ScheduleTemplate,
    key: Option<DayKey>,
    date: NaiveDate,
) -> Result<Vec<EntryDescriptor>, ScheduleError> {
    let (key, slots) = match key {
        Some(key) => {
            let slots = template
                .slots_for_key(key)
                .ok_or(ValidationError::MissingDayKey(key))?;
            (key, slots)
        }
        None => template.resolve(DayOfWeek::of(date)),
    };

    let entries: Vec<EntryDescriptor> = normalize_day(key, slots)?
        .into_iter()
        .zip(1u64..)
        .map(|(slot, tracking_id)| EntryDescriptor {
            date,
            start_minutes: slot.start,
            end_minutes: slot.end,
            break_minutes: slot.break_minutes,
            tracking_id,
        })
        .collect();
    debug!("Built {} entries for {} from '{}'", entries.len(), date, key);
    Ok(entries)
}
