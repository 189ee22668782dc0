//! HTTP transport abstraction.
//!
//! The client only builds requests and interprets bodies; connection
//! handling, TLS, redirects and timeouts belong to the transport.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               GlpiClient                │
//! │   (query building, compression, sniff)  │
//! └──────────────────┬──────────────────────┘
//!                    │ HttpTransport::send
//!          ┌────────┴────────┐
//!          ▼                 ▼
//! ┌─────────────────┐ ┌─────────────────┐
//! │ ReqwestTransport│ │  test doubles   │
//! │   (blocking)    │ │                 │
//! └─────────────────┘ └─────────────────┘
//! ```

mod blocking;

pub use blocking::ReqwestTransport;

use crate::error::Result;

/// HTTP method used by the GLPI protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// JSON protocol
    Get,
    /// Legacy XML protocol
    Post,
}

impl Method {
    /// Get method name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outbound HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method
    pub method: Method,
    /// Absolute URL including query string
    pub url: String,
    /// Header name/value pairs, in order
    pub headers: Vec<(String, String)>,
    /// Request body (empty for GET)
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Create a POST request with a body
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport trait for pluggable HTTP backends.
///
/// `Err` means no response was obtained at all; an error status is still
/// returned as `Ok` so the caller can tell the two apart.
pub trait HttpTransport {
    /// Execute one request, blocking until the response body is read
    fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}
