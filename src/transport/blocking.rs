//! Blocking HTTP transport backed by `reqwest`.

use std::time::Duration;

use reqwest::blocking::Client;

use super::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::config::ServerConfig;
use crate::error::{GlpiError, Result};

/// Default transport: one pooled blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport from server settings
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone());

        if config.no_ssl_check {
            tracing::warn!("TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(path) = &config.ca_cert_file {
            let pem = std::fs::read(path).map_err(|e| {
                GlpiError::Config(format!("Failed to read CA file {}: {e}", path.display()))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| GlpiError::Config(format!("Invalid CA certificate: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| GlpiError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url).body(body),
        };
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        tracing::debug!("{} {}", method, url);

        let response = builder.send()?;

        let status = response.status().as_u16();
        let body = response.bytes()?;

        tracing::debug!("{} {} -> {} ({} bytes)", method, url, status, body.len());

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
