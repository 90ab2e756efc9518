// src/clock_time.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TimeFormatError;

pub const MINUTES_PER_HOUR: u32 = 60;
pub const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

static CLOCK_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("clock time regex is valid"));

/// Parses `H:MM` or `HH:MM` into minutes since midnight.
pub fn parse_clock_time(input: &str) -> Result<u32, TimeFormatError> {
    let trimmed = input.trim();
    let caps = CLOCK_TIME_RE
        .captures(trimmed)
        .ok_or_else(|| TimeFormatError::new(input))?;

    // Both groups are guaranteed digits by the regex
    let hours: u32 = caps[1].parse().map_err(|_| TimeFormatError::new(input))?;
    let minutes: u32 = caps[2].parse().map_err(|_| TimeFormatError::new(input))?;

    if hours > 23 || minutes >= MINUTES_PER_HOUR {
        return Err(TimeFormatError::new(input));
    }

    Ok(hours * MINUTES_PER_HOUR + minutes)
}

/// Formats minutes since midnight as `H:MM` (unpadded hours).
///
/// Jittered end times can run past midnight; hours keep counting (`24:10`)
/// rather than wrapping, so the value always round-trips to the same minute
/// count.
pub fn format_clock_time(minutes: u32) -> String {
    format!(
        "{}:{:02}",
        minutes / MINUTES_PER_HOUR,
        minutes % MINUTES_PER_HOUR
    )
}

/// Reads a duration written either as a clock string (`"8:00"`, `"00:30"`)
/// or as a plain count of minutes (`"480"`).
pub fn parse_duration_minutes(input: &str) -> Result<u32, TimeFormatError> {
    let trimmed = input.trim();
    if let Ok(minutes) = trimmed.parse::<u32>() {
        return Ok(minutes);
    }
    parse_clock_time(trimmed)
}
