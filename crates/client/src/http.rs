//! Unary HTTP transport.

use async_trait::async_trait;
use mercury_core::{Error, Result};
use mercury_wire::JsonValue;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

const LOG_TARGET: &str = "mercury::client";

/// HTTP verbs a unary call may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// CONNECT (not supported)
    Connect,
    /// OPTIONS
    Options,
    /// TRACE (not supported)
    Trace,
    /// PATCH
    Patch,
}

impl HttpMethod {
    /// All verbs.
    pub const ALL: [HttpMethod; 9] = [
        HttpMethod::Get,
        HttpMethod::Head,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Connect,
        HttpMethod::Options,
        HttpMethod::Trace,
        HttpMethod::Patch,
    ];

    /// Upper-case verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// True if the encoded request travels as the body, false if it travels
    /// as query parameters.
    pub fn carries_body(&self) -> bool {
        matches!(
            self,
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete
        )
    }

    /// CONNECT and TRACE are rejected before any I/O.
    pub fn is_supported(&self) -> bool {
        !matches!(self, HttpMethod::Connect | HttpMethod::Trace)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_input(format!("unknown HTTP method '{}'", s)))
    }
}

/// One unary request, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Verb
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// Query parameters (read-only verbs)
    pub query: Vec<(String, String)>,
    /// JSON body (body-carrying verbs)
    pub body: Option<JsonValue>,
}

/// Performs unary HTTP requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the decoded JSON response body.
    ///
    /// Non-success statuses are returned as [`Error::Http`].
    async fn request(&self, request: HttpRequest) -> Result<JsonValue>;
}

/// [`HttpTransport`] backed by a blocking `ureq` agent.
///
/// Requests run on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct UreqHttpTransport {
    agent: ureq::Agent,
}

impl UreqHttpTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

#[async_trait]
impl HttpTransport for UreqHttpTransport {
    async fn request(&self, request: HttpRequest) -> Result<JsonValue> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute(&agent, request))
            .await
            .map_err(|e| Error::transport(format!("HTTP worker failed: {}", e)))?
    }
}

fn execute(agent: &ureq::Agent, request: HttpRequest) -> Result<JsonValue> {
    let url = request.url.as_str();
    debug!(target: LOG_TARGET, method = %request.method, url = %url, "Sending unary request");

    let sent = match request.method {
        HttpMethod::Get | HttpMethod::Head | HttpMethod::Options => {
            let mut builder = match request.method {
                HttpMethod::Get => agent.get(url),
                HttpMethod::Head => agent.head(url),
                _ => agent.options(url),
            };
            for (name, value) in &request.query {
                builder = builder.query(name, value);
            }
            builder.header("Accept", "application/json").call()
        }
        HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete => {
            let body = request
                .body
                .as_ref()
                .map(JsonValue::to_string)
                .unwrap_or_else(|| "{}".to_string());
            let builder = match request.method {
                HttpMethod::Post => agent.post(url),
                HttpMethod::Put => agent.put(url),
                HttpMethod::Patch => agent.patch(url),
                _ => agent.delete(url).force_send_body(),
            };
            builder
                .header("Content-Type", "application/json")
                .header("Accept", "application/json")
                .send(body.as_bytes())
        }
        HttpMethod::Connect | HttpMethod::Trace => {
            return Err(Error::unsupported(request.method.as_str()));
        }
    };

    let mut response = sent.map_err(|e| match e {
        ureq::Error::StatusCode(status) => {
            warn!(target: LOG_TARGET, url = %url, status, "Unary request rejected");
            Error::Http {
                status,
                reason: format!("{} {} failed", request.method, url),
            }
        }
        other => Error::transport(format!("{} {}: {}", request.method, url, other)),
    })?;

    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| Error::transport(format!("failed to read response: {}", e)))?;
    parse_body(&text)
}

/// Decode a response body; an empty body is an empty object.
pub(crate) fn parse_body(text: &str) -> Result<JsonValue> {
    if text.trim().is_empty() {
        return Ok(JsonValue::Object(Default::default()));
    }
    serde_json::from_str(text)
        .map_err(|e| Error::decode("response", "JSON body", format!("invalid JSON ({})", e)))
}
