use super::{RemoteStream, Transport};
use mcup_core::{Error, Result, REQUEST_TIMEOUT_SECS};
use reqwest::blocking::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("mcup/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP transport
///
/// Metadata requests share one fixed timeout. Artifact downloads only bound
/// the connect phase, since a large jar on a slow link can legitimately take
/// longer than any metadata call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    download_client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::remote_request_with_source("", "failed to build HTTP client", e))?;

        let download_client = Client::builder()
            .connect_timeout(timeout)
            .timeout(None)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::remote_request_with_source("", "failed to build HTTP client", e))?;

        Ok(Self {
            client,
            download_client,
        })
    }
}

fn map_reqwest_error(url: &str, err: reqwest::Error) -> Error {
    let message = if err.is_timeout() {
        format!("timed out after {REQUEST_TIMEOUT_SECS}s")
    } else if let Some(status) = err.status() {
        format!("server returned status {status}")
    } else {
        err.to_string()
    };
    Error::remote_request_with_source(url, message, err)
}

impl Transport for HttpTransport {
    fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| map_reqwest_error(url, e))?;

        let body = response.text().map_err(|e| map_reqwest_error(url, e))?;

        serde_json::from_str(&body)
            .map_err(|e| Error::remote_data(url, format!("response is not valid JSON: {e}")))
    }

    fn fetch_stream(&self, url: &str) -> Result<RemoteStream> {
        tracing::debug!(url, "GET (stream)");
        let response = self
            .download_client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| map_reqwest_error(url, e))?;

        Ok(RemoteStream {
            content_length: response.content_length(),
            body: Box::new(response),
        })
    }
}
