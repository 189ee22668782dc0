//! GLPI server client.
//!
//! # JSON protocol
//!
//! ```text
//! send_json ─> build_url ─> GET ─> parse JSON body
//! ```
//!
//! # XML protocol
//!
//! ```text
//!   [Start] ─> Compress ──────> Send ─────────> Classify ─────────> Decompress ─────> Parse ───> [Success]
//!                 │               │                 │                    │              │
//!                 v               v                 v                    v              v
//!          [FailCompress]  [FailTransport]  [FailUnknownFormat]  [FailDecompress]  [FailParse]
//! ```
//!
//! Every failure is logged where it happens and ends the call. Nothing is
//! retried here; retry policy belongs to the transport or the caller.

use serde_json::Value;

use crate::codec::{sniff, Compression, ResponseFormat};
use crate::config::Config;
use crate::error::{GlpiError, Result};
use crate::message::{MessageParser, XmlMessageParser};
use crate::query::{build_url, Parameters};
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};

/// Bytes of a bad response written to the log
const LOG_PREFIX_BYTES: usize = 500;

/// Client for the GLPI agent protocols
#[derive(Debug, Clone)]
pub struct GlpiClient<T, P = XmlMessageParser> {
    transport: T,
    compression: Compression,
    parser: P,
}

impl GlpiClient<ReqwestTransport> {
    /// Build a reqwest-backed client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.server)?;
        let compression = config.compression.build()?;
        Ok(GlpiClient::new(transport).with_compression(compression))
    }
}

impl<T: HttpTransport> GlpiClient<T> {
    /// Create a client, probing the host for compression support
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            compression: Compression::detect(),
            parser: XmlMessageParser::default(),
        }
    }
}

impl<T: HttpTransport, P: MessageParser> GlpiClient<T, P> {
    /// Replace the compression strategy
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Replace the reply parser
    pub fn with_parser<Q: MessageParser>(self, parser: Q) -> GlpiClient<T, Q> {
        GlpiClient {
            transport: self.transport,
            compression: self.compression,
            parser,
        }
    }

    /// Active compression strategy
    pub fn compression(&self) -> &Compression {
        &self.compression
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call the JSON protocol: GET `url?action=...` and parse the reply.
    pub fn send_json(&self, url: &str, params: &Parameters) -> Result<Value> {
        let url = build_url(url, params);
        let request = HttpRequest::get(url.as_str()).header("Pragma", "no-cache");

        let response = self.transport.send(request).map_err(|e| {
            tracing::error!("GET {} failed: {}", url, e);
            e
        })?;
        if !response.is_success() {
            tracing::error!("GET {} failed with status {}", url, response.status);
            return Err(GlpiError::HttpStatus {
                status: response.status,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            tracing::error!(
                "Invalid JSON reply for action {}: {}; reply starts with: {}",
                params.action(),
                e,
                prefix(&response.body)
            );
            GlpiError::Json(e)
        })
    }

    /// Call the legacy XML protocol: POST the envelope and return the
    /// parsed reply content.
    pub fn send_xml(&self, url: &str, envelope: &str) -> Result<Value> {
        let body = self.compression.compress(envelope.as_bytes()).map_err(|e| {
            tracing::error!("Failed to compress message with {}: {}", self.compression.mode(), e);
            e
        })?;

        let request = HttpRequest::post(url, body)
            .header("Pragma", "no-cache")
            .header("Content-Type", self.compression.content_type());

        let response = self.transport.send(request).map_err(|e| {
            tracing::error!("POST {} failed: {}", url, e);
            e
        })?;
        if !response.is_success() {
            tracing::error!("POST {} failed with status {}", url, response.status);
            return Err(GlpiError::HttpStatus {
                status: response.status,
            });
        }

        if response.body.is_empty() {
            tracing::error!("Unknown content format: empty reply from {}", url);
            return Err(GlpiError::EmptyResponse);
        }

        let sniffed = sniff(&response.body);
        if sniffed.format == ResponseFormat::Unknown {
            tracing::error!(
                "Unknown content format from {}: {}",
                url,
                prefix(&response.body)
            );
            return Err(GlpiError::UnknownFormat);
        }
        tracing::debug!(
            "Reply from {} detected as {} ({} of {} bytes)",
            url,
            sniffed.format,
            sniffed.payload.len(),
            response.body.len()
        );

        let decoded = self
            .compression
            .decode(sniffed.format, sniffed.payload)
            .map_err(|e| {
                tracing::error!(
                    "Failed to decompress {} reply: {}; raw reply: {}",
                    sniffed.format,
                    e,
                    prefix(&response.body)
                );
                e
            })?;

        let text = String::from_utf8_lossy(&decoded);
        let message = self.parser.parse(&text).map_err(|e| {
            tracing::error!(
                "Unexpected reply content: {}; first line: {}",
                e,
                text.lines().next().unwrap_or_default()
            );
            e
        })?;

        Ok(message.into_content())
    }
}

/// Lossy text of the first bytes of a buffer, for diagnostics
fn prefix(data: &[u8]) -> String {
    String::from_utf8_lossy(&data[..data.len().min(LOG_PREFIX_BYTES)]).into_owned()
}
