// src/schedule.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::clock_time::{parse_clock_time, parse_duration_minutes, MINUTES_PER_DAY};
use crate::error::{ScheduleError, TimeFormatError, ValidationError};

// --- Weekday keys ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    /// Day number as JavaScript's `Date.getDay()` counts it (0 = Sunday).
    pub fn js_index(self) -> u8 {
        match self {
            DayOfWeek::Sunday => 0,
            DayOfWeek::Monday => 1,
            DayOfWeek::Tuesday => 2,
            DayOfWeek::Wednesday => 3,
            DayOfWeek::Thursday => 4,
            DayOfWeek::Friday => 5,
            DayOfWeek::Saturday => 6,
        }
    }

    pub fn from_js_index(index: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.js_index() == index)
    }

    pub fn short_name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Mon",
            DayOfWeek::Tuesday => "Tue",
            DayOfWeek::Wednesday => "Wed",
            DayOfWeek::Thursday => "Thu",
            DayOfWeek::Friday => "Fri",
            DayOfWeek::Saturday => "Sat",
            DayOfWeek::Sunday => "Sun",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Key of a [`ScheduleTemplate`] entry: a weekday or the `default` fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayKey {
    Day(DayOfWeek),
    Default,
}

pub const DEFAULT_DAY_KEY: &str = "default";

impl FromStr for DayKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(DEFAULT_DAY_KEY) {
            return Ok(DayKey::Default);
        }
        if let Ok(index) = trimmed.parse::<u8>() {
            return DayOfWeek::from_js_index(index)
                .map(DayKey::Day)
                .ok_or_else(|| ValidationError::UnknownDayKey(s.to_string()));
        }
        // chrono accepts "Mon", "monday", "FRI", ...
        trimmed
            .parse::<Weekday>()
            .map(|w| DayKey::Day(w.into()))
            .map_err(|_| ValidationError::UnknownDayKey(s.to_string()))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayKey::Day(day) => write!(f, "{}", day),
            DayKey::Default => f.write_str(DEFAULT_DAY_KEY),
        }
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

// --- Slots ---

/// A minute amount written as a number (`30`) or as a clock string (`"0:30"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinutesValue {
    Count(u32),
    Clock(String),
}

impl MinutesValue {
    pub fn minutes(&self) -> Result<u32, TimeFormatError> {
        match self {
            MinutesValue::Count(m) => Ok(*m),
            MinutesValue::Clock(s) => parse_duration_minutes(s),
        }
    }
}

impl Default for MinutesValue {
    fn default() -> Self {
        MinutesValue::Count(0)
    }
}

/// `{ "start": "8:30", "end": "13:00" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSlot {
    pub start: String,
    pub end: String,
}

/// `{ "start": "9:00", "durationMinutes": 480, "breakMinutes": 30 }`, also
/// written `{ "start": "9:00", "hours": "8:00", "pause": "00:30" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanSlot {
    pub start: String,
    #[serde(alias = "hours")]
    pub duration_minutes: MinutesValue,
    #[serde(alias = "pause", default)]
    pub break_minutes: MinutesValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeSlot {
    Range(RangeSlot),
    Span(SpanSlot),
}

/// A slot reduced to minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedSlot {
    pub start: u32,
    pub end: u32,
    pub break_minutes: u32,
}

impl TimeSlot {
    pub fn range(start: &str, end: &str) -> Self {
        TimeSlot::Range(RangeSlot {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    pub fn span(start: &str, duration_minutes: u32, break_minutes: u32) -> Self {
        TimeSlot::Span(SpanSlot {
            start: start.to_string(),
            duration_minutes: MinutesValue::Count(duration_minutes),
            break_minutes: MinutesValue::Count(break_minutes),
        })
    }

    /// Parses the clock strings. Only format errors are reported here; the
    /// ordering invariants are checked by [`NormalizedSlot::check`].
    pub fn normalize(&self) -> Result<NormalizedSlot, TimeFormatError> {
        match self {
            TimeSlot::Range(slot) => Ok(NormalizedSlot {
                start: parse_clock_time(&slot.start)?,
                end: parse_clock_time(&slot.end)?,
                break_minutes: 0,
            }),
            TimeSlot::Span(slot) => {
                let start = parse_clock_time(&slot.start)?;
                let duration = slot.duration_minutes.minutes()?;
                let break_minutes = slot.break_minutes.minutes()?;
                // Saturates so absurd durations reach `check` as past-midnight slots
                Ok(NormalizedSlot {
                    start,
                    end: start.saturating_add(duration).saturating_add(break_minutes),
                    break_minutes,
                })
            }
        }
    }
}

impl NormalizedSlot {
    pub fn span(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn check(&self, day: DayKey, index: usize) -> Result<(), ValidationError> {
        if self.start >= self.end {
            return Err(ValidationError::SlotNotIncreasing {
                day,
                index,
                start: self.start,
                end: self.end,
            });
        }
        if self.end > MINUTES_PER_DAY {
            return Err(ValidationError::SlotPastMidnight {
                day,
                index,
                end: self.end,
            });
        }
        if self.break_minutes > self.span() {
            return Err(ValidationError::BreakExceedsSlot {
                day,
                index,
                break_minutes: self.break_minutes,
                span: self.span(),
            });
        }
        Ok(())
    }
}

/// Normalizes and checks one day's slots, in template order.
pub fn normalize_day(day: DayKey, slots: &[TimeSlot]) -> Result<Vec<NormalizedSlot>, ScheduleError> {
    let mut normalized: Vec<NormalizedSlot> = Vec::with_capacity(slots.len());
    for (index, slot) in slots.iter().enumerate() {
        let current = slot.normalize()?;
        current.check(day, index)?;
        if let Some(previous) = normalized.last() {
            if current.start < previous.end {
                return Err(ValidationError::OverlappingSlots { day, index }.into());
            }
        }
        normalized.push(current);
    }
    Ok(normalized)
}

// --- Template ---

/// Weekly schedule: weekday (or `default`) to the ordered slots worked that day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleTemplate {
    days: BTreeMap<DayKey, Vec<TimeSlot>>,
}

impl ScheduleTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, key: DayKey, slots: Vec<TimeSlot>) -> Self {
        self.days.insert(key, slots);
        self
    }

    pub fn insert(&mut self, key: DayKey, slots: Vec<TimeSlot>) {
        self.days.insert(key, slots);
    }

    /// Monday to Friday from 9:00, eight hours of work plus a 30 minute pause.
    pub fn standard_week() -> Self {
        let mut template = Self::new();
        for day in &DayOfWeek::ALL[..5] {
            template.insert(DayKey::Day(*day), vec![TimeSlot::span("9:00", 8 * 60, 30)]);
        }
        template
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Slots for `day`: the exact weekday entry, else `default`, else none.
    pub fn resolve_slots(&self, day: DayOfWeek) -> &[TimeSlot] {
        self.resolve(day).1
    }

    /// Like [`resolve_slots`](Self::resolve_slots), also returning the key
    /// that matched. Unmatched days report their own weekday key.
    pub fn resolve(&self, day: DayOfWeek) -> (DayKey, &[TimeSlot]) {
        let exact = DayKey::Day(day);
        if let Some(slots) = self.days.get(&exact) {
            return (exact, slots);
        }
        match self.days.get(&DayKey::Default) {
            Some(slots) => (DayKey::Default, slots),
            None => (exact, &[]),
        }
    }

    /// Slots stored under exactly `key`, without the `default` fallback.
    pub fn slots_for_key(&self, key: DayKey) -> Option<&[TimeSlot]> {
        self.days.get(&key).map(Vec::as_slice)
    }

    pub fn slots_for_date(&self, date: NaiveDate) -> &[TimeSlot] {
        self.resolve_slots(DayOfWeek::of(date))
    }

    pub fn days(&self) -> impl Iterator<Item = (&DayKey, &Vec<TimeSlot>)> {
        self.days.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(Vec::is_empty)
    }

    /// Checks every day against the slot invariants.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for (key, slots) in &self.days {
            normalize_day(*key, slots)?;
        }
        Ok(())
    }
}
