// src/error.rs

use chrono::NaiveDate;
use thiserror::Error;

use crate::schedule::DayKey;

/// A clock-time string that is not `H:MM` / `HH:MM`, or a minute count that
/// could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid clock time '{input}': expected H:MM or HH:MM")]
pub struct TimeFormatError {
    pub input: String,
}

impl TimeFormatError {
    pub fn new<S: Into<String>>(input: S) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Template, range or exception data outside the documented invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Slot {index} of '{day}' ends at or before it starts ({start} >= {end} minutes)")]
    SlotNotIncreasing {
        day: DayKey,
        index: usize,
        start: u32,
        end: u32,
    },

    #[error("Slot {index} of '{day}' has a {break_minutes} minute break longer than the slot itself ({span} minutes)")]
    BreakExceedsSlot {
        day: DayKey,
        index: usize,
        break_minutes: u32,
        span: u32,
    },

    #[error("Slot {index} of '{day}' ends at {end} minutes, past midnight")]
    SlotPastMidnight { day: DayKey, index: usize, end: u32 },

    #[error("Template has no slots under '{0}'")]
    MissingDayKey(DayKey),

    #[error("Slot {index} of '{day}' overlaps the previous slot")]
    OverlappingSlots { day: DayKey, index: usize },

    #[error("Date range is inverted: {start} is after {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("Unknown weekday key '{0}' (expected 0-6, a weekday name or \"default\")")]
    UnknownDayKey(String),
}

/// Anything that stops generation before a single entry is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error(transparent)]
    Format(#[from] TimeFormatError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
