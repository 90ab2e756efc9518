// src/cli.rs

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::date_range::DateRange;
use crate::error::ValidationError;
use crate::exceptions::ExceptionInterval;
use crate::schedule::DayKey;

/// Fill an attendance service from a weekly schedule template.
#[derive(Debug, Parser)]
#[command(name = "attendance-fill", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate entries for the range and write them to the service
    Fill {
        #[command(flatten)]
        range: RangeArgs,
        #[command(flatten)]
        generation: GenerationArgs,
    },
    /// Generate entries without writing anything
    Plan {
        #[command(flatten)]
        range: RangeArgs,
        #[command(flatten)]
        generation: GenerationArgs,
        /// Write the planned entries as CSV to this file (`-` for stdout)
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },
    /// Delete every existing entry in the range
    Delete {
        #[command(flatten)]
        range: RangeArgs,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Generate entries for the range and post them to BambooHR in one request
    BambooFill {
        #[command(flatten)]
        range: RangeArgs,
        #[command(flatten)]
        generation: GenerationArgs,
        /// Day to leave empty, as DATE or DATE:REASON (repeatable)
        #[arg(long = "off", value_name = "DAY")]
        days_off: Vec<DayOff>,
    },
    /// Post one day's template slots to BambooHR, without jitter
    BambooDay {
        /// Day to fill, YYYY-MM-DD (default: today)
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,
        /// Template key to take the slots from (default: the date's weekday)
        #[arg(long, value_name = "KEY")]
        slots: Option<DayKey>,
        /// Template file (overrides ATTENDANCE_TEMPLATE_PATH)
        #[arg(long, value_name = "PATH")]
        template: Option<PathBuf>,
    },
    /// Validate and print the effective weekly template
    Template {
        /// Template file (defaults to ATTENDANCE_TEMPLATE_PATH)
        #[arg(long, value_name = "PATH")]
        template: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// First day, YYYY-MM-DD (default: start of the month)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last day, YYYY-MM-DD (default: end of the month)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    /// Missing bounds come from the month of the other bound, or of `today`
    /// when neither is given.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, ValidationError> {
        let anchor = self.from.or(self.to).unwrap_or(today);
        let month = DateRange::month_of(anchor);
        DateRange::new(
            self.from.unwrap_or_else(|| month.start()),
            self.to.unwrap_or_else(|| month.end()),
        )
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct GenerationArgs {
    /// Maximum jitter in minutes (overrides ATTENDANCE_ENTROPY_MINUTES)
    #[arg(long, value_name = "MINUTES")]
    pub entropy: Option<u32>,

    /// Seed for reproducible jitter
    #[arg(long)]
    pub seed: Option<u64>,

    /// Template file (overrides ATTENDANCE_TEMPLATE_PATH)
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,
}

pub const DEFAULT_DAY_OFF_REASON: &str = "Day off";

/// A day the caller marks as not worked, e.g. `2024-05-01:Labour Day`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOff {
    pub date: NaiveDate,
    pub reason: String,
}

impl DayOff {
    pub fn interval(&self) -> ExceptionInterval {
        ExceptionInterval::whole_day(self.reason.clone(), self.date)
    }
}

impl FromStr for DayOff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, reason) = match s.split_once(':') {
            Some((day, reason)) if !reason.trim().is_empty() => (day, reason.trim()),
            Some((day, _)) => (day, DEFAULT_DAY_OFF_REASON),
            None => (s, DEFAULT_DAY_OFF_REASON),
        };
        let date = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
            .map_err(|e| format!("invalid day off '{}': {}", s, e))?;
        Ok(Self {
            date,
            reason: reason.to_string(),
        })
    }
}
