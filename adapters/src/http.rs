//! HTTP control-plane adapter
//!
//! Speaks a small REST contract:
//!
//! - `GET  {base}/functions/{id}/config`  -> `{"memory_mb": <u64>}`
//! - `PUT  {base}/functions/{id}/config`  <- `{"memory_mb": <u64>}`
//! - `POST {base}/functions/{id}/invoke`  <- payload JSON
//!
//! The measured duration is read from the `x-duration-ms` response header of
//! the invoke call. A missing or unparsable header means the invocation is
//! unmeasured (`Ok(None)`); an HTTP or transport fault is a hard
//! `Error::Invocation`. Per-invocation timeout policy, if any, belongs here
//! (configure it on the `reqwest::Client`), never in the engine.

use async_trait::async_trait;
use memsweep_core::error::{Error, Result};
use memsweep_core::FunctionAdapter;
use serde::{Deserialize, Serialize};

/// Response header carrying the remote-measured duration in milliseconds
pub const DURATION_HEADER: &str = "x-duration-ms";

#[derive(Debug, Serialize, Deserialize)]
struct ConfigBody {
    memory_mb: u64,
}

/// [`FunctionAdapter`] over a generic HTTP control plane
#[derive(Debug, Clone)]
pub struct HttpAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAdapter {
    /// Create an adapter targeting `base_url` with a default client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an adapter with a pre-configured client (timeouts, TLS, auth)
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    fn config_url(&self, function: &str) -> String {
        format!("{}/functions/{}/config", self.base_url, function)
    }

    fn invoke_url(&self, function: &str) -> String {
        format!("{}/functions/{}/invoke", self.base_url, function)
    }
}

#[async_trait]
impl FunctionAdapter for HttpAdapter {
    async fn get_configuration(&self, function: &str) -> Result<u64> {
        let response = self
            .client
            .get(self.config_url(function))
            .send()
            .await
            .map_err(|e| Error::ConfigurationUpdate {
                value: 0,
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Error::ConfigurationUpdate {
                value: 0,
                reason: format!("configuration read returned {}", response.status()),
            });
        }

        let body: ConfigBody = response.json().await.map_err(|e| Error::ConfigurationUpdate {
            value: 0,
            reason: format!("malformed configuration body: {e}"),
        })?;
        Ok(body.memory_mb)
    }

    async fn set_configuration(&self, function: &str, memory_mb: u64) -> Result<()> {
        let response = self
            .client
            .put(self.config_url(function))
            .json(&ConfigBody { memory_mb })
            .send()
            .await
            .map_err(|e| Error::ConfigurationUpdate {
                value: memory_mb,
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Error::ConfigurationUpdate {
                value: memory_mb,
                reason: format!("configuration update returned {}", response.status()),
            });
        }

        tracing::debug!(function, memory_mb, "resource configuration applied");
        Ok(())
    }

    async fn invoke(&self, function: &str, payload: &serde_json::Value) -> Result<Option<u64>> {
        let response = self
            .client
            .post(self.invoke_url(function))
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Invocation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Invocation(format!(
                "invoke returned {}",
                response.status()
            )));
        }

        let duration = parse_duration_header(
            response
                .headers()
                .get(DURATION_HEADER)
                .and_then(|v| v.to_str().ok()),
        );
        if duration.is_none() {
            tracing::debug!(function, "response carried no parsable timing header");
        }
        Ok(duration)
    }
}

/// Parse the duration header value, tolerating fractional milliseconds
///
/// Unparsable or absent values mean "unmeasured", never an error.
fn parse_duration_header(value: Option<&str>) -> Option<u64> {
    let raw = value?.trim();
    if let Ok(ms) = raw.parse::<u64>() {
        return Some(ms);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
        .map(|ms| ms.round() as u64)
}
