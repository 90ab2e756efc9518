// src/kenjo_client.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::attendance_api::{
    AttendanceApi, CalendarAssignment, CalendarDetail, CalendarTemplate, ExistingEntry, Identity,
};
use crate::attendance_client::{ApiClient, AuthContext, RemoteError};
use crate::date_range::{start_of_day, to_api_timestamp, DateRange};
use crate::exceptions::{CustomHolidayRecord, HolidayRecord, TimeOffRecord};
use crate::generator::EntryDescriptor;

pub const KENJO_API_URL: &str = "https://api.kenjo.io";

// --- Endpoint table ---

#[derive(Debug, Clone)]
pub struct KenjoEndpoints {
    base_url: String,
}

impl KenjoEndpoints {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        Url::parse(base_url).map_err(|source| RemoteError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn auth_cookie(&self) -> String {
        self.url("/auth/cookie")
    }

    pub fn me(&self) -> String {
        self.url("/user-account-db/user-accounts/me")
    }

    pub fn user_calendar(&self, user_id: &str) -> String {
        self.url(&format!("/user-work-db/{}/calendar", user_id))
    }

    pub fn calendar_find(&self) -> String {
        self.url("/calendar-db/find")
    }

    pub fn calendar_templates(&self) -> String {
        self.url("/calendar-template-db/templates")
    }

    pub fn time_off_find(&self) -> String {
        self.url("/user-time-off-request/find")
    }

    pub fn attendance(&self) -> String {
        self.url("/user-attendance-db")
    }

    pub fn attendance_find(&self) -> String {
        self.url("/user-attendance-db/find")
    }
}

impl Default for KenjoEndpoints {
    fn default() -> Self {
        Self {
            base_url: KENJO_API_URL.to_string(),
        }
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct AuthCookieResponse {
    token_type: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserAccount {
    owner_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserWorkCalendar {
    calendar_id: String,
}

#[derive(Debug, Deserialize)]
struct CustomHolidayWire {
    #[serde(rename = "holidayDate", deserialize_with = "date_prefix")]
    holiday_date: NaiveDate,
    #[serde(rename = "holidayName")]
    holiday_name: String,
}

#[derive(Debug, Deserialize)]
struct CalendarWire {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(rename = "_calendarTemplateKey")]
    calendar_template_key: String,
    #[serde(rename = "_customHolidays", default)]
    custom_holidays: Vec<CustomHolidayWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HolidayWire {
    #[serde(deserialize_with = "date_prefix")]
    holiday_date: NaiveDate,
    holiday_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarTemplateWire {
    template_key: String,
    #[serde(default)]
    holidays: Vec<HolidayWire>,
}

#[derive(Debug, Deserialize)]
struct TimeOffWire {
    #[serde(rename = "_from")]
    from: DateTime<Utc>,
    #[serde(rename = "_to")]
    to: DateTime<Utc>,
    #[serde(rename = "_policyName")]
    policy_name: String,
}

#[derive(Debug, Deserialize)]
struct AttendanceWire {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

/// Body of a new attendance entry. Times are minutes since midnight.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendanceEntry {
    pub owner_id: String,
    pub date: String,
    pub start_time: u32,
    pub end_time: u32,
    pub break_time: u32,
    pub tracking_id: u64,
    #[serde(rename = "_approved")]
    pub approved: bool,
    #[serde(rename = "_changesTracking")]
    pub changes_tracking: Vec<serde_json::Value>,
    #[serde(rename = "_deleted")]
    pub deleted: bool,
    #[serde(rename = "_userId")]
    pub user_id: String,
}

impl NewAttendanceEntry {
    pub fn from_descriptor(user_id: &str, entry: &EntryDescriptor) -> Self {
        Self {
            owner_id: user_id.to_string(),
            date: to_api_timestamp(start_of_day(entry.date)),
            start_time: entry.start_minutes,
            end_time: entry.end_minutes,
            break_time: entry.break_minutes,
            tracking_id: entry.tracking_id,
            approved: false,
            changes_tracking: Vec::new(),
            deleted: false,
            user_id: user_id.to_string(),
        }
    }
}

/// Accepts `2024-05-01` as well as `2024-05-01T00:00:00.000Z`, keeping the
/// calendar date as written.
fn date_prefix<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let day = raw.split('T').next().unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

// --- Client ---

/// Kenjo attendance integration.
#[derive(Debug, Clone)]
pub struct KenjoApi {
    client: ApiClient,
    endpoints: KenjoEndpoints,
}

impl KenjoApi {
    pub fn new(client: ApiClient, endpoints: KenjoEndpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl AttendanceApi for KenjoApi {
    async fn authenticate(&self) -> Result<AuthContext, RemoteError> {
        let token: AuthCookieResponse = self
            .client
            .call(Method::GET, &self.endpoints.auth_cookie(), None, None)
            .await?;
        info!("Obtained {} token from session cookie", token.token_type);
        Ok(AuthContext::Bearer {
            token_type: token.token_type,
            access_token: token.access_token,
        })
    }

    async fn fetch_identity(&self, auth: &AuthContext) -> Result<Identity, RemoteError> {
        let account: UserAccount = self
            .client
            .call(Method::GET, &self.endpoints.me(), Some(auth), None)
            .await?;
        Ok(Identity {
            user_id: account.owner_id,
        })
    }

    async fn fetch_calendar_assignment(
        &self,
        auth: &AuthContext,
        identity: &Identity,
    ) -> Result<CalendarAssignment, RemoteError> {
        let work: UserWorkCalendar = self
            .client
            .call(
                Method::GET,
                &self.endpoints.user_calendar(&identity.user_id),
                Some(auth),
                None,
            )
            .await?;
        Ok(CalendarAssignment {
            calendar_id: work.calendar_id,
        })
    }

    async fn fetch_calendar(
        &self,
        auth: &AuthContext,
        assignment: &CalendarAssignment,
    ) -> Result<Option<CalendarDetail>, RemoteError> {
        let body = json!({ "_id": assignment.calendar_id });
        let calendars: Vec<CalendarWire> = self
            .client
            .call(
                Method::POST,
                &self.endpoints.calendar_find(),
                Some(auth),
                Some(&body),
            )
            .await?;

        if calendars.len() > 1 {
            debug!(
                "Calendar lookup for {} returned {} calendars, using the first",
                assignment.calendar_id,
                calendars.len()
            );
        }

        Ok(calendars.into_iter().next().map(|calendar| CalendarDetail {
            calendar_id: calendar
                .id
                .unwrap_or_else(|| assignment.calendar_id.clone()),
            template_key: calendar.calendar_template_key,
            custom_holidays: calendar
                .custom_holidays
                .into_iter()
                .map(|h| CustomHolidayRecord {
                    name: h.holiday_name,
                    date: h.holiday_date,
                })
                .collect(),
        }))
    }

    async fn fetch_calendar_templates(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<CalendarTemplate>, RemoteError> {
        let templates: Vec<CalendarTemplateWire> = self
            .client
            .call(
                Method::GET,
                &self.endpoints.calendar_templates(),
                Some(auth),
                None,
            )
            .await?;

        Ok(templates
            .into_iter()
            .map(|t| CalendarTemplate {
                template_key: t.template_key,
                holidays: t
                    .holidays
                    .into_iter()
                    .map(|h| HolidayRecord {
                        name: h.holiday_key,
                        date: h.holiday_date,
                    })
                    .collect(),
            })
            .collect())
    }

    async fn fetch_time_off(
        &self,
        auth: &AuthContext,
        identity: &Identity,
        range: &DateRange,
    ) -> Result<Vec<TimeOffRecord>, RemoteError> {
        let body = json!({
            "_from": { "$gte": to_api_timestamp(range.start_instant()) },
            "_to": { "$lte": to_api_timestamp(range.end_instant()) },
            "_userId": identity.user_id,
        });
        let requests: Vec<TimeOffWire> = self
            .client
            .call(
                Method::POST,
                &self.endpoints.time_off_find(),
                Some(auth),
                Some(&body),
            )
            .await?;

        Ok(requests
            .into_iter()
            .map(|t| TimeOffRecord {
                policy_name: t.policy_name,
                from: t.from,
                to: t.to,
            })
            .collect())
    }

    async fn create_entry(
        &self,
        auth: &AuthContext,
        identity: &Identity,
        entry: &EntryDescriptor,
    ) -> Result<(), RemoteError> {
        let payload = NewAttendanceEntry::from_descriptor(&identity.user_id, entry);
        let body = serde_json::to_value(&payload).map_err(|source| RemoteError::Decode {
            url: self.endpoints.attendance(),
            source,
        })?;
        let created: serde_json::Value = self
            .client
            .call(
                Method::POST,
                &self.endpoints.attendance(),
                Some(auth),
                Some(&body),
            )
            .await?;
        debug!("Created entry {}: {}", entry.tracking_id, created);
        Ok(())
    }

    async fn fetch_entries(
        &self,
        auth: &AuthContext,
        identity: &Identity,
        range: &DateRange,
    ) -> Result<Vec<ExistingEntry>, RemoteError> {
        let body = json!({
            "_userId": identity.user_id,
            "date": {
                "$gte": to_api_timestamp(range.start_instant()),
                "$lte": to_api_timestamp(range.end_instant()),
            },
        });
        let entries: Vec<AttendanceWire> = self
            .client
            .call(
                Method::POST,
                &self.endpoints.attendance_find(),
                Some(auth),
                Some(&body),
            )
            .await?;

        Ok(entries
            .into_iter()
            .map(|e| ExistingEntry {
                id: e.id,
                date: e.date.map(|d| d.date_naive()),
            })
            .collect())
    }

    async fn delete_entries(&self, auth: &AuthContext, ids: &[String]) -> Result<(), RemoteError> {
        let body = json!({ "ids": ids });
        let _: serde_json::Value = self
            .client
            .call(
                Method::DELETE,
                &self.endpoints.attendance(),
                Some(auth),
                Some(&body),
            )
            .await?;
        Ok(())
    }
}
