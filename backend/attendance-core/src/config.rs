// src/config.rs

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::attendance_client::{ClientConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::error::ScheduleError;
use crate::kenjo_client::KENJO_API_URL;
use crate::schedule::ScheduleTemplate;

pub const ENV_PREFIX: &str = "ATTENDANCE_";
pub const DEFAULT_ENTROPY_MINUTES: u32 = 15;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment configuration: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid API URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("BambooHR is not configured: {0} is missing")]
    MissingSetting(&'static str),

    #[error("Could not read template file {}: {source}", .path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse template file {}: {source}", .path.display())]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid template in {}: {source}", .path.display())]
    TemplateInvalid {
        path: PathBuf,
        #[source]
        source: ScheduleError,
    },
}

/// Settings read from `ATTENDANCE_*` environment variables (and `.env`).
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Raw `Cookie` header of a logged-in browser session.
    pub session_cookie: Option<String>,
    /// JSON schedule template; the standard week is used when unset.
    pub template_path: Option<PathBuf>,
    #[serde(default = "default_entropy_minutes")]
    pub entropy_minutes: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Company origin of a BambooHR account, e.g. `https://acme.bamboohr.com`.
    pub bamboo_url: Option<String>,
    /// `CSRF_TOKEN` of a logged-in BambooHR page.
    pub csrf_token: Option<String>,
    pub employee_id: Option<String>,
}

/// Everything a BambooHR run needs, all present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BambooSettings {
    pub url: String,
    pub csrf_token: String,
    pub employee_id: String,
}

fn default_api_url() -> String {
    KENJO_API_URL.to_string()
}

fn default_entropy_minutes() -> u32 {
    DEFAULT_ENTROPY_MINUTES
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: AppConfig = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        debug!(
            "Loaded configuration: api_url={}, template={:?}, entropy={}",
            config.api_url, config.template_path, config.entropy_minutes
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in std::iter::once(&self.api_url).chain(self.bamboo_url.as_ref()) {
            Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
                url: url.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn bamboo_settings(&self) -> Result<BambooSettings, ConfigError> {
        let require = |value: &Option<String>, name: &'static str| {
            value.clone().ok_or(ConfigError::MissingSetting(name))
        };
        Ok(BambooSettings {
            url: require(&self.bamboo_url, "ATTENDANCE_BAMBOO_URL")?,
            csrf_token: require(&self.csrf_token, "ATTENDANCE_CSRF_TOKEN")?,
            employee_id: require(&self.employee_id, "ATTENDANCE_EMPLOYEE_ID")?,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
            session_cookie: self.session_cookie.clone(),
        }
    }

    /// Reads and validates the configured template, or falls back to the
    /// standard week.
    pub fn load_template(&self) -> Result<ScheduleTemplate, ConfigError> {
        let path = match &self.template_path {
            Some(path) => path,
            None => {
                info!("No template file configured, using the standard week");
                return Ok(ScheduleTemplate::standard_week());
            }
        };

        let json = fs::read_to_string(path).map_err(|source| ConfigError::TemplateRead {
            path: path.clone(),
            source,
        })?;
        let template =
            ScheduleTemplate::from_json(&json).map_err(|source| ConfigError::TemplateParse {
                path: path.clone(),
                source,
            })?;
        template
            .validate()
            .map_err(|source| ConfigError::TemplateInvalid {
                path: path.clone(),
                source,
            })?;

        info!("Loaded schedule template from {}", path.display());
        Ok(template)
    }
}
