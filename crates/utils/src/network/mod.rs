//! Network access for metadata queries and artifact downloads.
//!
//! Everything that talks to a remote server goes through the [`Transport`]
//! trait so the cache, resolver and fetcher can be exercised without a
//! network.
//!
//! ## Key Components
//!
//! - **`http`**: [`HttpTransport`], the blocking `reqwest` implementation
//!   used by the binary.
//! - **`testing`**: [`FakeTransport`], an in-memory implementation that
//!   records every requested URL (behind the `testing` feature).

pub mod http;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use http::HttpTransport;
#[cfg(any(test, feature = "testing"))]
pub use testing::FakeTransport;

use mcup_core::Result;
use std::fmt;
use std::io::Read;

/// A response body being streamed from the remote end
pub struct RemoteStream {
    /// Length announced by the server, if it announced one
    pub content_length: Option<u64>,
    pub body: Box<dyn Read>,
}

impl fmt::Debug for RemoteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteStream")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Remote data access
///
/// Implementations must report network and status failures as
/// `Error::RemoteRequest` and undecodable bodies as `Error::RemoteData`.
pub trait Transport {
    /// Fetch a URL and decode its body as JSON
    fn fetch_json(&self, url: &str) -> Result<serde_json::Value>;

    /// Open a URL for streaming
    fn fetch_stream(&self, url: &str) -> Result<RemoteStream>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
        (**self).fetch_json(url)
    }

    fn fetch_stream(&self, url: &str) -> Result<RemoteStream> {
        (**self).fetch_stream(url)
    }
}
