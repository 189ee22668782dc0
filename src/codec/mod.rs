//! Body compression and response format detection.
//!
//! # Outbound
//!
//! | Mode                    | Content-Type                   | Implementation          |
//! |-------------------------|--------------------------------|-------------------------|
//! | [`DeflateInProcess`]    | `application/x-compress-zlib`  | flate2 (zlib feature)   |
//! | [`GzipExternalProcess`] | `application/x-compress-gzip`  | `gzip -c <tmpfile>`     |
//! | [`None`]                | `application/xml`              | passthrough             |
//!
//! # Inbound
//!
//! Replies are classified by [`sniff`] from raw bytes, then decoded with
//! [`Compression::decode`].
//!
//! ```rust,ignore
//! use glpi::codec::{sniff, Compression};
//!
//! let compression = Compression::detect();
//! let body = compression.compress(envelope.as_bytes())?;
//!
//! let sniffed = sniff(&reply);
//! let text = compression.decode(sniffed.format, sniffed.payload)?;
//! ```
//!
//! [`DeflateInProcess`]: CompressionMode::DeflateInProcess
//! [`GzipExternalProcess`]: CompressionMode::GzipExternalProcess
//! [`None`]: CompressionMode::None

#[cfg(feature = "zlib")]
mod deflate;
mod gzip;
mod mode;
mod sniff;
mod strategy;

#[cfg(feature = "zlib")]
pub use deflate::DeflateCodec;
pub use gzip::{GzipCommand, DEFAULT_GZIP_COMMAND};
pub use mode::CompressionMode;
pub use sniff::{sniff, ResponseFormat, Sniffed, GZIP_SIGNATURE, HTML_WRAPPER, ZLIB_SIGNATURE};
pub use strategy::{CapabilityProbe, Compression, SystemProbe};
