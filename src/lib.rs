//! # GLPI Transport - agent-to-server messaging
//!
//! Transport client for the GLPI agent protocols. Inventory and discovery
//! messages are exchanged with the server over HTTP in one of two encodings:
//!
//! - **Legacy XML protocol**: an XML envelope POSTed with a negotiated
//!   compression, answered in zlib, gzip or plain XML
//! - **JSON protocol**: a GET with an `action` and nested query parameters,
//!   answered in JSON
//!
//! ## Protocol Overview
//!
//! ```text
//! Agent                                                 GLPI Server
//!   |                                                        |
//!   |-- POST <REQUEST> (zlib | gzip | xml) ----------------->|
//!   |<----------------- <REPLY> (zlib | gzip | xml) ---------|
//!   |                                                        |
//!   |-- GET ?action=getConfig&machineid=...&task[]=... ----->|
//!   |<------------------------------------- {"status":...} --|
//! ```
//!
//! ### Compression
//!
//! The outbound encoding is chosen once per client by probing the host:
//!
//! | Mode                  | Content-Type                  | Needs                    |
//! |-----------------------|-------------------------------|--------------------------|
//! | DeflateInProcess      | `application/x-compress-zlib` | `zlib` feature (default) |
//! | GzipExternalProcess   | `application/x-compress-gzip` | `gzip` in `PATH`         |
//! | None                  | `application/xml`             | nothing                  |
//!
//! Replies are classified from raw bytes (`78 9C`, `1F 8B 08`, trailing XML),
//! never from the `Content-Type` header.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use glpi::{Config, GlpiClient, OutboundMessage, Parameters};
//!
//! let client = GlpiClient::from_config(&Config::from_env())?;
//!
//! // Legacy XML protocol
//! let prolog = OutboundMessage::prolog("host-2024-06-01-10-00-00").to_xml();
//! let reply = client.send_xml("https://glpi.example.com/", &prolog)?;
//! println!("PROLOG_FREQ: {}", reply["PROLOG_FREQ"]);
//!
//! // JSON protocol
//! let params = Parameters::new("getConfig")
//!     .with("machineid", "host-2024-06-01-10-00-00")
//!     .with("task", vec!["inventory", "deploy"]);
//! let config = client.send_json("https://glpi.example.com/plugins/glpiinventory/", &params)?;
//! ```
//!
//! ## Modules
//!
//! - [`client`]: Protocol orchestration (`send_json`, `send_xml`)
//! - [`codec`]: Compression strategies and response sniffing
//! - [`query`]: GET URL construction and value encoding
//! - [`transport`]: HTTP transport trait and reqwest backend
//! - [`message`]: XML envelope builder and reply parser
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod query;
pub mod transport;

// Re-exports for convenience
pub use client::GlpiClient;
pub use codec::{sniff, Compression, CompressionMode, ResponseFormat};
pub use config::Config;
pub use error::{GlpiError, Result};
pub use message::{InboundMessage, MessageParser, OutboundMessage, XmlMessageParser};
pub use query::{build_url, encode_value, ParamValue, Parameters};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
