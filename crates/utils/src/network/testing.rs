use super::{RemoteStream, Transport};
use mcup_core::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;

#[derive(Debug, Clone)]
enum FakeResponse {
    Json(serde_json::Value),
    Malformed,
    Bytes {
        body: Vec<u8>,
        declared_length: Option<u64>,
    },
    Failure(String),
}

/// In-memory [`Transport`] that serves canned responses and records every
/// URL it is asked for
///
/// Unknown URLs fail like a 404 would.
#[derive(Debug, Default)]
pub struct FakeTransport {
    responses: HashMap<String, FakeResponse>,
    requests: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `value` as the JSON body of `url`
    pub fn with_json(mut self, url: impl Into<String>, value: serde_json::Value) -> Self {
        self.responses.insert(url.into(), FakeResponse::Json(value));
        self
    }

    /// Serve a body that is not JSON
    pub fn with_malformed(mut self, url: impl Into<String>) -> Self {
        self.responses.insert(url.into(), FakeResponse::Malformed);
        self
    }

    /// Serve `body` with an honest content length
    pub fn with_bytes(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let declared_length = Some(body.len() as u64);
        self.responses.insert(
            url.into(),
            FakeResponse::Bytes {
                body,
                declared_length,
            },
        );
        self
    }

    /// Serve `body` but announce `declared_length` bytes
    pub fn with_truncated_bytes(
        mut self,
        url: impl Into<String>,
        body: impl Into<Vec<u8>>,
        declared_length: u64,
    ) -> Self {
        self.responses.insert(
            url.into(),
            FakeResponse::Bytes {
                body: body.into(),
                declared_length: Some(declared_length),
            },
        );
        self
    }

    /// Fail every request to `url` with a transport error
    pub fn with_failure(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses
            .insert(url.into(), FakeResponse::Failure(message.into()));
        self
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// How many times `url` was requested
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|u| *u == url).count()
    }

    fn lookup(&self, url: &str) -> Result<FakeResponse> {
        self.requests.borrow_mut().push(url.to_string());
        match self.responses.get(url) {
            Some(FakeResponse::Failure(message)) => Err(Error::remote_request(url, message.clone())),
            Some(response) => Ok(response.clone()),
            None => Err(Error::remote_request(url, "server returned status 404 Not Found")),
        }
    }
}

impl Transport for FakeTransport {
    fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
        match self.lookup(url)? {
            FakeResponse::Json(value) => Ok(value),
            FakeResponse::Bytes { body, .. } => serde_json::from_slice(&body)
                .map_err(|e| Error::remote_data(url, format!("response is not valid JSON: {e}"))),
            FakeResponse::Malformed | FakeResponse::Failure(_) => {
                Err(Error::remote_data(url, "response is not valid JSON"))
            }
        }
    }

    fn fetch_stream(&self, url: &str) -> Result<RemoteStream> {
        match self.lookup(url)? {
            FakeResponse::Bytes {
                body,
                declared_length,
            } => Ok(RemoteStream {
                content_length: declared_length,
                body: Box::new(Cursor::new(body)),
            }),
            FakeResponse::Json(value) => {
                let body = serde_json::to_vec(&value)
                    .map_err(|e| Error::remote_data(url, e.to_string()))?;
                Ok(RemoteStream {
                    content_length: Some(body.len() as u64),
                    body: Box::new(Cursor::new(body)),
                })
            }
            FakeResponse::Malformed | FakeResponse::Failure(_) => Ok(RemoteStream {
                content_length: None,
                body: Box::new(Cursor::new(b"<html>".to_vec())),
            }),
        }
    }
}
