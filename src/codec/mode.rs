//! Compression mode selected for a client.

use serde::{Deserialize, Serialize};

/// Outbound compression modes, in probe precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// No compression (plain XML body)
    None,
    /// RFC 1950 zlib stream produced in-process
    #[serde(rename = "zlib")]
    DeflateInProcess,
    /// gzip stream produced by an external `gzip` executable
    #[serde(rename = "gzip")]
    GzipExternalProcess,
}

impl CompressionMode {
    /// `Content-Type` advertised on outbound requests
    pub fn content_type(&self) -> &'static str {
        match self {
            CompressionMode::None => "application/xml",
            CompressionMode::DeflateInProcess => "application/x-compress-zlib",
            CompressionMode::GzipExternalProcess => "application/x-compress-gzip",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            CompressionMode::None => "NONE",
            CompressionMode::DeflateInProcess => "ZLIB",
            CompressionMode::GzipExternalProcess => "GZIP",
        }
    }
}

impl std::fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for CompressionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zlib" | "deflate" => Ok(Self::DeflateInProcess),
            "gzip" | "gz" => Ok(Self::GzipExternalProcess),
            "none" | "plain" | "xml" => Ok(Self::None),
            _ => Err(format!("Unknown compression mode: {s}")),
        }
    }
}
