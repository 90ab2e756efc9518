// src/attendance_api.rs

use async_trait::async_trait;

use crate::attendance_client::{AuthContext, RemoteError};
use crate::date_range::DateRange;
use crate::exceptions::{CustomHolidayRecord, HolidayRecord, TimeOffRecord};
use crate::generator::EntryDescriptor;

/// The authenticated user entries are written for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

/// Which working calendar the user is assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarAssignment {
    pub calendar_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDetail {
    pub calendar_id: String,
    /// Key of the calendar template providing the public holidays.
    pub template_key: String,
    pub custom_holidays: Vec<CustomHolidayRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarTemplate {
    pub template_key: String,
    pub holidays: Vec<HolidayRecord>,
}

/// An entry already stored remotely, as far as bulk delete cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingEntry {
    pub id: String,
    pub date: Option<chrono::NaiveDate>,
}

/// Remote operations one attendance integration provides. Every call is a
/// single request; implementations never retry.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn authenticate(&self) -> Result<AuthContext, RemoteError>;

    async fn fetch_identity(&self, auth: &AuthContext) -> Result<Identity, RemoteError>;

    async fn fetch_calendar_assignment(
        &self,
        auth: &AuthContext,
        identity: &Identity,
    ) -> Result<CalendarAssignment, RemoteError>;

    /// `None` when the service knows no calendar under that id.
    async fn fetch_calendar(
        &self,
        auth: &AuthContext,
        assignment: &CalendarAssignment,
    ) -> Result<Option<CalendarDetail>, RemoteError>;

    async fn fetch_calendar_templates(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<CalendarTemplate>, RemoteError>;

    async fn fetch_time_off(
        &self,
        auth: &AuthContext,
        identity: &Identity,
        range: &DateRange,
    ) -> Result<Vec<TimeOffRecord>, RemoteError>;

    async fn create_entry(
        &self,
        auth: &AuthContext,
        identity: &Identity,
        entry: &EntryDescriptor,
    ) -> Result<(), RemoteError>;

    async fn fetch_entries(
        &self,
        auth: &AuthContext,
        identity: &Identity,
        range: &DateRange,
    ) -> Result<Vec<ExistingEntry>, RemoteError>;

    /// Removes every listed entry in one request.
    async fn delete_entries(&self, auth: &AuthContext, ids: &[String]) -> Result<(), RemoteError>;
}

/// Integrations that accept a whole run in one request and authenticate out
/// of band (a token taken from a browser session).
#[async_trait]
pub trait BatchEntryApi: Send + Sync {
    async fn create_entries(&self, entries: &[EntryDescriptor]) -> Result<(), RemoteError>;
}
