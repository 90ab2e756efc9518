// src/exceptions.rs

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::date_range::{end_of_day, start_of_day, DateRange};

// --- Resolver inputs ---

/// Approved leave, as returned by the time-off endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOffRecord {
    pub policy_name: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Public holiday from the calendar template the user is assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayRecord {
    pub name: String,
    pub date: NaiveDate,
}

/// Company-specific holiday attached directly to the user's calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomHolidayRecord {
    pub name: String,
    pub date: NaiveDate,
}

// --- Resolver output ---

/// A closed instant interval during which no entry is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInterval {
    pub reason: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ExceptionInterval {
    pub fn whole_day<S: Into<String>>(reason: S, day: NaiveDate) -> Self {
        Self {
            reason: reason.into(),
            start: start_of_day(day),
            end: end_of_day(day),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.contains(start_of_day(day))
    }

    fn intersects(&self, range: &DateRange) -> bool {
        self.start <= range.end_instant() && self.end >= range.start_instant()
    }
}

/// Merges the three exception sources into one list, keeping only intervals
/// that touch `range`. Sources are appended in order (time off, template
/// holidays, custom holidays) and never deduplicated against each other.
pub fn resolve_exceptions(
    time_off: &[TimeOffRecord],
    holidays: &[HolidayRecord],
    custom_holidays: &[CustomHolidayRecord],
    range: &DateRange,
) -> Vec<ExceptionInterval> {
    let time_off_intervals = time_off.iter().map(|t| ExceptionInterval {
        reason: t.policy_name.clone(),
        start: t.from,
        end: t.to,
    });
    let holiday_intervals = holidays
        .iter()
        .map(|h| ExceptionInterval::whole_day(h.name.clone(), h.date));
    let custom_intervals = custom_holidays
        .iter()
        .map(|h| ExceptionInterval::whole_day(h.name.clone(), h.date));

    let resolved: Vec<ExceptionInterval> = time_off_intervals
        .chain(holiday_intervals)
        .chain(custom_intervals)
        .filter(|interval| interval.intersects(range))
        .collect();

    debug!(
        "Resolved {} exception intervals for {} ({} time off, {} holidays, {} custom holidays in input)",
        resolved.len(),
        range,
        time_off.len(),
        holidays.len(),
        custom_holidays.len()
    );
    resolved
}

/// Reasons of every interval containing `day`, in resolver order.
pub fn reasons_for_day(exceptions: &[ExceptionInterval], day: NaiveDate) -> Vec<String> {
    exceptions
        .iter()
        .filter(|interval| interval.contains_day(day))
        .map(|interval| interval.reason.clone())
        .collect()
}
