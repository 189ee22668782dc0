//! GLPI transport error types.
//!
//! Every way a `send_json`/`send_xml` call can fail maps to exactly one
//! variant. Failures are logged where they happen; callers only decide
//! whether to retry, abort the run, or report to an operator.

use thiserror::Error;

/// GLPI transport errors.
#[derive(Error, Debug)]
pub enum GlpiError {
    /// No response was obtained from the server (connection, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered, but not with a success status.
    #[error("Request failed with HTTP status {status}")]
    HttpStatus {
        /// HTTP status code returned by the server.
        status: u16,
    },

    /// Outbound body could not be compressed.
    #[error("Compression error: {0}")]
    Compression(String),

    /// Inbound body could not be decompressed.
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// Response bytes matched none of the known wire formats.
    #[error("Unknown response content format")]
    UnknownFormat,

    /// Server answered with an empty body.
    #[error("Empty response body")]
    EmptyResponse,

    /// JSON response body failed to parse.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Inbound XML message failed to parse.
    #[error("Invalid message: {0}")]
    Message(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias for GLPI transport operations
pub type Result<T> = std::result::Result<T, GlpiError>;

impl From<reqwest::Error> for GlpiError {
    fn from(err: reqwest::Error) -> Self {
        GlpiError::Transport(err.to_string())
    }
}

impl From<toml::de::Error> for GlpiError {
    fn from(err: toml::de::Error) -> Self {
        GlpiError::Config(err.to_string())
    }
}

impl From<quick_xml::Error> for GlpiError {
    fn from(err: quick_xml::Error) -> Self {
        GlpiError::Message(err.to_string())
    }
}
