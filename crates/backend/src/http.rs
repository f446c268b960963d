//! Shared HTTP transport for backend adapters.
//!
//! Wraps a `reqwest::Client` with pre-built headers and the timeout
//! policy all adapters share: 3 s to connect, 60 s for a generation
//! round trip, 3 s for liveness probes. Maps transport-level failures
//! onto the router's error taxonomy.

use reqwest::{
    Client, StatusCode,
    header::{self, HeaderMap, HeaderValue},
};
use rudder_core::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Connect timeout applied to every adapter connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
/// Overall bound on a generation call.
pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(60);
/// Overall bound on a liveness or status probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Shared transport: client plus pre-built headers.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    headers: HeaderMap,
}

impl HttpTransport {
    /// Transport without authentication (local backends).
    pub fn no_auth() -> Self {
        Self {
            client: build_client(),
            headers: base_headers(),
        }
    }

    /// Transport with Bearer token authentication.
    pub fn bearer(key: &str) -> Result<Self> {
        let mut headers = base_headers();
        let value = format!("Bearer {key}")
            .parse()
            .map_err(|_| Error::Validation("api key is not a valid header value".into()))?;
        headers.insert(header::AUTHORIZATION, value);
        Ok(Self {
            client: build_client(),
            headers,
        })
    }

    /// POST a JSON body and deserialize a JSON response.
    ///
    /// Non-success statuses become [`Error::Backend`] with the error
    /// body attached; connection and timeout failures become
    /// [`Error::Unavailable`].
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &impl Serialize,
        timeout: Duration,
    ) -> Result<T> {
        if let Ok(raw) = serde_json::to_string(body) {
            tracing::trace!(url, "request: {raw}");
        }
        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let text = response.text().await.map_err(classify)?;
        tracing::trace!(%status, "response: {text}");

        if !status.is_success() {
            return Err(error_for(status, text));
        }
        serde_json::from_str(&text)
            .map_err(|e| Error::backend(status.as_u16(), format!("malformed response: {e}")))
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let text = response.text().await.map_err(classify)?;
        if !status.is_success() {
            return Err(error_for(status, text));
        }
        serde_json::from_str(&text)
            .map_err(|e| Error::backend(status.as_u16(), format!("malformed response: {e}")))
    }

    /// GET a URL and report whether it answered with a success status
    /// within [`PROBE_TIMEOUT`]. Never errors.
    pub async fn probe(&self, url: &str) -> bool {
        self.client
            .get(url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// A copy of this transport with a Bearer credential attached.
    /// The underlying client (and its connection pool) is shared.
    pub fn with_bearer(&self, key: &str) -> Result<Self> {
        let mut headers = self.headers.clone();
        let value = format!("Bearer {key}")
            .parse()
            .map_err(|_| Error::Validation("api key is not a valid header value".into()))?;
        headers.insert(header::AUTHORIZATION, value);
        Ok(Self {
            client: self.client.clone(),
            headers,
        })
    }

    /// The pre-built headers, exposed for tests.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

fn build_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_default()
}

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Map a reqwest error to the taxonomy: connect/timeout problems are
/// `Unavailable`, anything else reached the backend.
fn classify(err: reqwest::Error) -> Error {
    if err.is_connect() || err.is_timeout() {
        Error::Unavailable(err.to_string())
    } else if let Some(status) = err.status() {
        Error::backend(status.as_u16(), err.to_string())
    } else {
        Error::Unavailable(err.to_string())
    }
}

fn error_for(status: StatusCode, body: String) -> Error {
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_owned()
    } else {
        body
    };
    Error::backend(status.as_u16(), message)
}
