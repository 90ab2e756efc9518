// src/attendance_client.rs

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const CSRF_HEADER: &str = "x-csrf-token";

// --- Errors ---

#[derive(Error, Debug)]
pub enum RemoteError {
    /// The service answered with a non-success status; body kept verbatim.
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// DNS, TLS, connection reset, timeout, or a body that could not be read.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),
}

impl RemoteError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RemoteError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// --- Credentials ---

/// Credential obtained once per run and attached to every later call.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// `Authorization: <token_type> <access_token>`
    Bearer {
        token_type: String,
        access_token: String,
    },
    /// Session-bound CSRF token sent as `x-csrf-token`.
    Csrf(String),
}

impl AuthContext {
    pub fn bearer<S: Into<String>>(access_token: S) -> Self {
        AuthContext::Bearer {
            token_type: "Bearer".to_string(),
            access_token: access_token.into(),
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            AuthContext::Bearer {
                token_type,
                access_token,
            } => request.header(AUTHORIZATION, format!("{} {}", token_type, access_token)),
            AuthContext::Csrf(token) => request.header(CSRF_HEADER, token),
        }
    }
}

// Keep tokens out of logs
impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthContext::Bearer { token_type, .. } => {
                write!(f, "AuthContext::Bearer({}, <redacted>)", token_type)
            }
            AuthContext::Csrf(_) => f.write_str("AuthContext::Csrf(<redacted>)"),
        }
    }
}

// --- Client ---

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub timeout: Duration,
    /// Raw `Cookie` header carrying the browser session, if the service needs one.
    pub session_cookie: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            session_cookie: None,
        }
    }
}

/// Thin JSON-over-HTTP wrapper. One attempt per call, no retries.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http_client: Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, RemoteError> {
        let mut default_headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value =
                HeaderValue::from_str(cookie).map_err(|_| RemoteError::InvalidHeader("Cookie"))?;
            default_headers.insert(COOKIE, value);
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(RemoteError::Network)?;

        Ok(Self { http_client })
    }

    pub fn build_request(
        &self,
        method: Method,
        url: &str,
        auth: Option<&AuthContext>,
        body: Option<&serde_json::Value>,
    ) -> Result<RequestBuilder, RemoteError> {
        let parsed = Url::parse(url).map_err(|source| RemoteError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let mut request = self
            .http_client
            .request(method, parsed)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        if let Some(auth) = auth {
            request = auth.apply(request);
        }
        if let Some(body) = body {
            request = request.body(body.to_string());
        }
        Ok(request)
    }

    /// Sends one request and decodes the JSON response into `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        auth: Option<&AuthContext>,
        body: Option<&serde_json::Value>,
    ) -> Result<T, RemoteError> {
        let request = self.build_request(method.clone(), url, auth, body)?;
        debug!("Sending {} {}", method, url);

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(
                    "HTTP execution failed before receiving response ({} {}): {}",
                    method, url, e
                );
                return Err(RemoteError::Network(e));
            }
        };

        let status = response.status();
        info!("Received response for {} {}: Status={}", method, url, status);

        let bytes = response.bytes().await.map_err(|e| {
            error!("Failed to read response body ({} {}): {}", method, url, e);
            RemoteError::Network(e)
        })?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            error!(
                "API Error Response: Status={}, Body='{}' for {} {}",
                status, body, method, url
            );
            return Err(RemoteError::Http { status, body });
        }

        // 204 and friends: decode as JSON null so `()` and `Option<_>` work
        let payload: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };

        serde_json::from_slice::<T>(payload).map_err(|source| {
            warn!(
                "JSON deserialization failed for {} {}: {}",
                method, url, source
            );
            debug!("Raw body: {}", String::from_utf8_lossy(&bytes));
            RemoteError::Decode {
                url: url.to_string(),
                source,
            }
        })
    }
}
