//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (for the `glpi-client` binary)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::codec::{Compression, CompressionMode, GzipCommand, DEFAULT_GZIP_COMMAND};
use crate::error::{GlpiError, Result};

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Server connection configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Compression configuration
    #[serde(default)]
    pub compression: CompressionConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            GlpiError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        toml::from_str(&content)
            .map_err(|e| GlpiError::Config(format!("Failed to parse config: {e}")))
    }

    /// Default config file location (`<config dir>/glpi-agent/client.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glpi-agent").join("client.toml"))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Server settings
        if let Ok(url) = std::env::var("GLPI_SERVER") {
            config.server.url = url;
        }
        if let Ok(timeout) = std::env::var("GLPI_TIMEOUT") {
            if let Ok(timeout) = timeout.parse() {
                config.server.timeout_secs = timeout;
            }
        }
        if let Ok(agent) = std::env::var("GLPI_USER_AGENT") {
            config.server.user_agent = agent;
        }
        if let Ok(val) = std::env::var("GLPI_NO_SSL_CHECK") {
            config.server.no_ssl_check = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Ok(path) = std::env::var("GLPI_CA_CERT_FILE") {
            config.server.ca_cert_file = Some(PathBuf::from(path));
        }

        // Compression settings
        if let Ok(mode) = std::env::var("GLPI_COMPRESSION") {
            config.compression.mode = mode;
        }
        if let Ok(gzip) = std::env::var("GLPI_GZIP") {
            config.compression.gzip_command = gzip;
        }

        config
    }

    /// Merge with another config (other takes precedence where it differs
    /// from the defaults)
    pub fn merge(self, other: Self) -> Self {
        let server_default = ServerConfig::default();
        let compression_default = CompressionConfig::default();

        Self {
            server: ServerConfig {
                url: pick(self.server.url, other.server.url, &server_default.url),
                timeout_secs: pick(
                    self.server.timeout_secs,
                    other.server.timeout_secs,
                    &server_default.timeout_secs,
                ),
                user_agent: pick(
                    self.server.user_agent,
                    other.server.user_agent,
                    &server_default.user_agent,
                ),
                no_ssl_check: self.server.no_ssl_check || other.server.no_ssl_check,
                ca_cert_file: other.server.ca_cert_file.or(self.server.ca_cert_file),
            },
            compression: CompressionConfig {
                mode: pick(
                    self.compression.mode,
                    other.compression.mode,
                    &compression_default.mode,
                ),
                gzip_command: pick(
                    self.compression.gzip_command,
                    other.compression.gzip_command,
                    &compression_default.gzip_command,
                ),
            },
        }
    }
}

fn pick<T: PartialEq>(base: T, other: T, default: &T) -> T {
    if other == *default {
        base
    } else {
        other
    }
}

/// Server connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server URL (e.g., https://glpi.example.com/front/inventory.php)
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// `User-Agent` header value
    pub user_agent: String,

    /// Skip TLS certificate verification
    pub no_ssl_check: bool,

    /// Extra PEM bundle of trusted CA certificates
    pub ca_cert_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 180,
            user_agent: format!("GLPI-Agent_v{}", crate::VERSION),
            no_ssl_check: false,
            ca_cert_file: None,
        }
    }
}

/// Compression configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// `auto` to probe the host, or a forced mode (`zlib`, `gzip`, `none`)
    pub mode: String,

    /// gzip executable for the external-process fallback
    pub gzip_command: String,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            mode: "auto".to_string(),
            gzip_command: DEFAULT_GZIP_COMMAND.to_string(),
        }
    }
}

impl CompressionConfig {
    /// Build the compression strategy this configuration describes
    pub fn build(&self) -> Result<Compression> {
        let gzip = GzipCommand::new(&self.gzip_command);
        if self.mode.eq_ignore_ascii_case("auto") {
            return Ok(Compression::detect_with(&crate::codec::SystemProbe, gzip));
        }

        let mode: CompressionMode = self.mode.parse().map_err(GlpiError::Config)?;
        Ok(Compression::forced(mode, gzip))
    }
}
