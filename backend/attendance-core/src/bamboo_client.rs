// src/bamboo_client.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::attendance_api::BatchEntryApi;
use crate::attendance_client::{ApiClient, AuthContext, RemoteError};
use crate::generator::EntryDescriptor;

#[derive(Debug, Clone)]
pub struct BambooEndpoints {
    base_url: String,
}

impl BambooEndpoints {
    /// `base_url` is the company origin, e.g. `https://acme.bamboohr.com`.
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        Url::parse(base_url).map_err(|source| RemoteError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn clock_entries(&self) -> String {
        format!("{}/timesheet/clock/entries", self.base_url)
    }
}

// --- Wire format ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BambooClockEntry {
    /// Always null: the service assigns ids.
    pub id: Option<u64>,
    pub tracking_id: u64,
    pub employee_id: String,
    pub date: NaiveDate,
    pub start: String,
    pub end: String,
    pub note: String,
}

impl BambooClockEntry {
    pub fn from_descriptor(entry: &EntryDescriptor, employee_id: &str) -> Self {
        Self {
            id: None,
            tracking_id: entry.tracking_id,
            employee_id: employee_id.to_string(),
            date: entry.date,
            start: entry.start_clock_time(),
            end: entry.end_clock_time(),
            note: String::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ClockEntriesRequest<'a> {
    entries: &'a [BambooClockEntry],
}

// --- Client ---

/// BambooHR timesheet integration. Authenticates with the CSRF token of a
/// logged-in session and posts every entry in a single request.
#[derive(Debug, Clone)]
pub struct BambooApi {
    client: ApiClient,
    endpoints: BambooEndpoints,
    auth: AuthContext,
    employee_id: String,
}

impl BambooApi {
    pub fn new(
        client: ApiClient,
        endpoints: BambooEndpoints,
        csrf_token: String,
        employee_id: String,
    ) -> Self {
        Self {
            client,
            endpoints,
            auth: AuthContext::Csrf(csrf_token),
            employee_id,
        }
    }
}

#[async_trait]
impl BatchEntryApi for BambooApi {
    async fn create_entries(&self, entries: &[EntryDescriptor]) -> Result<(), RemoteError> {
        // Clock entries carry no break; the gap between slots is the break
        if entries.iter().any(|e| e.break_minutes > 0) {
            warn!("BambooHR clock entries have no break field, break minutes are dropped");
        }

        let wire: Vec<BambooClockEntry> = entries
            .iter()
            .map(|e| BambooClockEntry::from_descriptor(e, &self.employee_id))
            .collect();
        let body = serde_json::to_value(ClockEntriesRequest { entries: &wire }).map_err(|source| {
            RemoteError::Decode {
                url: self.endpoints.clock_entries(),
                source,
            }
        })?;

        let _: serde_json::Value = self
            .client
            .call(
                Method::POST,
                &self.endpoints.clock_entries(),
                Some(&self.auth),
                Some(&body),
            )
            .await?;
        info!(
            "Created {} clock entries for employee {}",
            wire.len(),
            self.employee_id
        );
        Ok(())
    }
}
