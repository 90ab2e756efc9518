// src/lib.rs

pub mod attendance_api;
pub mod attendance_client;
pub mod bamboo_client;
pub mod cli;
pub mod clock_time;
pub mod config;
pub mod date_range;
pub mod error;
pub mod exceptions;
pub mod generator;
pub mod jitter;
pub mod kenjo_client;
pub mod report;
pub mod schedule;
pub mod sync;

#[cfg(test)]
mod bamboo_client_tests;
#[cfg(test)]
mod clock_time_tests;
#[cfg(test)]
mod date_range_tests;
#[cfg(test)]
mod exceptions_tests;
#[cfg(test)]
mod jitter_tests;
#[cfg(test)]
mod schedule_tests;

pub use attendance_api::{AttendanceApi, BatchEntryApi};
pub use attendance_client::{ApiClient, AuthContext, ClientConfig, RemoteError};
pub use bamboo_client::{BambooApi, BambooEndpoints};
pub use config::{AppConfig, BambooSettings, ConfigError};
pub use date_range::DateRange;
pub use error::{ScheduleError, TimeFormatError, ValidationError};
pub use generator::{generate, named_day_entries, EntryDescriptor, Generation, SkipRecord};
pub use jitter::{JitterSource, RngJitter};
pub use kenjo_client::{KenjoApi, KenjoEndpoints};
pub use schedule::{DayKey, DayOfWeek, ScheduleTemplate, TimeSlot};
pub use sync::{
    BatchOrchestrator, DeleteOutcome, FillOutcome, FillRequest, LoggingObserver, SyncError,
    SyncEvent, SyncObserver, SyncOrchestrator, SyncPhase,
};
