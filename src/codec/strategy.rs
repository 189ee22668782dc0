//! Compression strategy selection and dispatch.
//!
//! The mode is chosen once, when the client is built, from what the host
//! can actually do:
//!
//! 1. native deflate compiled in (`zlib` feature) -> [`CompressionMode::DeflateInProcess`]
//! 2. a runnable `gzip` executable -> [`CompressionMode::GzipExternalProcess`]
//! 3. otherwise -> [`CompressionMode::None`]
//!
//! Probing goes through [`CapabilityProbe`] so tests can pin any mode.

#[cfg(feature = "zlib")]
use super::deflate::DeflateCodec;
use super::gzip::GzipCommand;
use super::mode::CompressionMode;
use super::sniff::ResponseFormat;
use crate::error::{GlpiError, Result};

/// Runtime capabilities relevant to compression
pub trait CapabilityProbe {
    /// Whether in-process deflate/inflate is available
    fn has_native_deflate(&self) -> bool;

    /// Whether the given gzip executable can be run
    fn has_gzip(&self, gzip: &GzipCommand) -> bool;
}

/// Probe that inspects the running host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl CapabilityProbe for SystemProbe {
    fn has_native_deflate(&self) -> bool {
        cfg!(feature = "zlib")
    }

    fn has_gzip(&self, gzip: &GzipCommand) -> bool {
        gzip.is_runnable()
    }
}

/// Selected compression strategy. Immutable once built.
#[derive(Debug, Clone)]
pub struct Compression {
    mode: CompressionMode,
    native: bool,
    gzip: GzipCommand,
}

impl Compression {
    /// Probe the host with the default `gzip` executable
    pub fn detect() -> Self {
        Self::detect_with(&SystemProbe, GzipCommand::default())
    }

    /// Probe with an explicit probe and gzip executable
    pub fn detect_with(probe: &dyn CapabilityProbe, gzip: GzipCommand) -> Self {
        let native = probe.has_native_deflate();
        let mode = if native {
            CompressionMode::DeflateInProcess
        } else if probe.has_gzip(&gzip) {
            CompressionMode::GzipExternalProcess
        } else {
            CompressionMode::None
        };

        tracing::debug!(
            "Compression probe: native_deflate={}, gzip={:?} -> {} ({})",
            native,
            gzip.program(),
            mode,
            mode.content_type()
        );

        Self { mode, native, gzip }
    }

    /// Force a mode without probing
    pub fn forced(mode: CompressionMode, gzip: GzipCommand) -> Self {
        tracing::debug!("Compression forced: {} ({})", mode, mode.content_type());
        Self {
            mode,
            native: cfg!(feature = "zlib"),
            gzip,
        }
    }

    /// Selected mode
    pub fn mode(&self) -> CompressionMode {
        self.mode
    }

    /// `Content-Type` to advertise for outbound bodies
    pub fn content_type(&self) -> &'static str {
        self.mode.content_type()
    }

    /// Compress an outbound body according to the selected mode
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self.mode {
            CompressionMode::None => Ok(data.to_vec()),
            CompressionMode::DeflateInProcess => deflate(data),
            CompressionMode::GzipExternalProcess => self.gzip.compress(data),
        }
    }

    /// Reverse [`Compression::compress`] for the selected mode
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self.mode {
            CompressionMode::None => Ok(data.to_vec()),
            CompressionMode::DeflateInProcess => inflate(data),
            CompressionMode::GzipExternalProcess => self.gzip.decompress(data),
        }
    }

    /// Decode a sniffed response payload by its detected format.
    ///
    /// The server picks the reply encoding, so this dispatches on the
    /// format rather than on the selected mode. Gzip replies use native
    /// inflate when compiled in and the external executable otherwise.
    pub fn decode(&self, format: ResponseFormat, payload: &[u8]) -> Result<Vec<u8>> {
        match format {
            ResponseFormat::PlainXml => Ok(payload.to_vec()),
            ResponseFormat::Deflate => inflate(payload),
            ResponseFormat::Gzip if self.native => gunzip(payload),
            ResponseFormat::Gzip => self.gzip.decompress(payload),
            ResponseFormat::Unknown => Err(GlpiError::UnknownFormat),
        }
    }
}

impl Default for Compression {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(feature = "zlib")]
fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    DeflateCodec::new().compress(data)
}

#[cfg(feature = "zlib")]
fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    DeflateCodec::new().decompress(data)
}

#[cfg(feature = "zlib")]
fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    DeflateCodec::new().gunzip(data)
}

#[cfg(not(feature = "zlib"))]
fn deflate(_data: &[u8]) -> Result<Vec<u8>> {
    Err(GlpiError::Compression(
        "native deflate support not compiled in".to_string(),
    ))
}

#[cfg(not(feature = "zlib"))]
fn inflate(_data: &[u8]) -> Result<Vec<u8>> {
    Err(GlpiError::Decompression(
        "native deflate support not compiled in".to_string(),
    ))
}

#[cfg(not(feature = "zlib"))]
fn gunzip(_data: &[u8]) -> Result<Vec<u8>> {
    Err(GlpiError::Decompression(
        "native deflate support not compiled in".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe {
        native: bool,
        gzip: bool,
    }

    impl CapabilityProbe for FixedProbe {
        fn has_native_deflate(&self) -> bool {
            self.native
        }

        fn has_gzip(&self, _gzip: &GzipCommand) -> bool {
            self.gzip
        }
    }

    fn detect(native: bool, gzip: bool) -> CompressionMode {
        Compression::detect_with(&FixedProbe { native, gzip }, GzipCommand::default()).mode()
    }

    #[test]
    fn test_probe_precedence() {
        assert_eq!(detect(true, true), CompressionMode::DeflateInProcess);
        assert_eq!(detect(true, false), CompressionMode::DeflateInProcess);
        assert_eq!(detect(false, true), CompressionMode::GzipExternalProcess);
        assert_eq!(detect(false, false), CompressionMode::None);
    }

    #[test]
    fn test_probe_is_deterministic() {
        let first = Compression::detect().mode();
        let second = Compression::detect().mode();
        assert_eq!(first, second);
    }

    #[test]
    fn test_passthrough() {
        let compression = Compression::forced(CompressionMode::None, GzipCommand::default());
        let body = b"<REQUEST/>";
        assert_eq!(compression.compress(body).unwrap(), body);
        assert_eq!(compression.decompress(body).unwrap(), body);
        assert_eq!(compression.content_type(), "application/xml");
    }

    #[test]
    fn test_forced_gzip_without_executable_fails() {
        let compression = Compression::forced(
            CompressionMode::GzipExternalProcess,
            GzipCommand::new("/nonexistent/glpi-test-gzip"),
        );
        let result = compression.compress(b"<REQUEST/>");
        assert!(matches!(result, Err(GlpiError::Compression(_))));
    }

    #[test]
    fn test_decode_plain_and_unknown() {
        let compression = Compression::forced(CompressionMode::None, GzipCommand::default());
        assert_eq!(
            compression
                .decode(ResponseFormat::PlainXml, b"<REPLY/>")
                .unwrap(),
            b"<REPLY/>"
        );
        assert!(matches!(
            compression.decode(ResponseFormat::Unknown, b"x"),
            Err(GlpiError::UnknownFormat)
        ));
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn test_deflate_roundtrip() {
        let compression =
            Compression::forced(CompressionMode::DeflateInProcess, GzipCommand::default());
        let body = b"<REQUEST><QUERY>PROLOG</QUERY></REQUEST>";
        let compressed = compression.compress(body).unwrap();
        assert_eq!(compression.decompress(&compressed).unwrap(), body);
        assert_eq!(
            compression
                .decode(ResponseFormat::Deflate, &compressed)
                .unwrap(),
            body
        );
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn test_decode_gzip_natively() {
        use std::io::Write;

        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"<REPLY/>").unwrap();
        let gz = encoder.finish().unwrap();

        let compression = Compression::forced(
            CompressionMode::None,
            GzipCommand::new("/nonexistent/glpi-test-gzip"),
        );
        assert_eq!(
            compression.decode(ResponseFormat::Gzip, &gz).unwrap(),
            b"<REPLY/>"
        );
    }
}
