//! Megaverse HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).

use std::time::Duration;

use megaverse_core::{GoalGrid, RawResponse};
use serde::Deserialize;

use crate::request::{ApiRequest, Method};

pub const DEFAULT_API_BASE: &str = "https://challenge.crossmint.io/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for client operations.
#[derive(Debug)]
pub enum ClientError {
    /// HTTP client could not be constructed
    Build(String),
    /// Network error (connect, TLS, socket timeout)
    Network(String),
    /// Non-200 HTTP status with response body
    Http(u16, String),
    /// Response body did not have the expected shape
    Parse(String),
    /// Still rate limited when the retry policy gave up
    RateLimited { attempts: u32 },
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Build(msg) => write!(f, "Cannot build HTTP client: {}", msg),
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ClientError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ClientError::RateLimited { attempts } => {
                write!(f, "Rate limited after {} attempt(s)", attempts)
            }
        }
    }
}

impl std::error::Error for ClientError {}

/// Transport seam between the reconciliation engine and the service.
///
/// `send` performs exactly one HTTP attempt and reports the raw result;
/// a non-200 status is `Ok`, only a missing response is `Err`.
pub trait MegaverseApi {
    fn candidate_id(&self) -> &str;

    fn send(&self, request: &ApiRequest) -> Result<RawResponse, ClientError>;
}

impl<A: MegaverseApi + ?Sized> MegaverseApi for &A {
    fn candidate_id(&self) -> &str {
        (**self).candidate_id()
    }

    fn send(&self, request: &ApiRequest) -> Result<RawResponse, ClientError> {
        (**self).send(request)
    }
}

#[derive(Debug, Deserialize)]
struct GoalResponse {
    goal: GoalGrid,
}

/// Decode a goal endpoint response. Anything but 200 is an error.
pub fn decode_goal(response: RawResponse) -> Result<GoalGrid, ClientError> {
    if response.status != 200 {
        return Err(ClientError::Http(response.status, response.body));
    }
    serde_json::from_str::<GoalResponse>(&response.body)
        .map(|r| r.goal)
        .map_err(|e| ClientError::Parse(format!("invalid goal response: {}", e)))
}

/// Extract the grid from an already-parsed `{ "goal": [[..]] }` body.
pub fn goal_from_json(body: serde_json::Value) -> Result<GoalGrid, ClientError> {
    serde_json::from_value::<GoalResponse>(body)
        .map(|r| r.goal)
        .map_err(|e| ClientError::Parse(format!("invalid goal response: {}", e)))
}

/// One-shot goal fetch: a single attempt, no retry.
pub fn fetch_goal<A: MegaverseApi + ?Sized>(api: &A) -> Result<GoalGrid, ClientError> {
    let request = ApiRequest::goal(api.candidate_id());
    let response = api.send(&request)?;
    decode_goal(response)
}

/// Megaverse API client (blocking).
#[derive(Clone)]
pub struct MegaverseClient {
    http: reqwest::blocking::Client,
    api_base: String,
    candidate_id: String,
}

impl MegaverseClient {
    /// Client against the public challenge API with the default timeout.
    pub fn new(candidate_id: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_base_url(candidate_id, DEFAULT_API_BASE, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url(
        candidate_id: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("megaverse/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            candidate_id: candidate_id.into(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// One-shot goal fetch.
    pub fn fetch_goal(&self) -> Result<GoalGrid, ClientError> {
        fetch_goal(self)
    }
}

impl MegaverseApi for MegaverseClient {
    fn candidate_id(&self) -> &str {
        &self.candidate_id
    }

    fn send(&self, request: &ApiRequest) -> Result<RawResponse, ClientError> {
        let url = self.url(&request.path);
        let mut req = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Delete => self.http.delete(&url),
        };
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        tracing::debug!(request = %request.label(), "sending");
        let response = req.send().map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(RawResponse { status, retry_after, body })
    }
}
