//! In-process zlib codec (CompressionMode::DeflateInProcess).
//!
//! Produces RFC 1950 framed streams, the format GLPI servers expect under
//! `application/x-compress-zlib`. Also inflates gzip-framed replies when the
//! server answers in gzip regardless of what was requested.

use flate2::read::GzDecoder;
use flate2::write::ZlibEncoder;
use flate2::{Compression as Level, Decompress, FlushDecompress, Status};
use std::io::{Read, Write};

use crate::error::{GlpiError, Result};

/// Zlib codec
#[derive(Debug, Clone, Copy)]
pub struct DeflateCodec {
    /// Compression level (0-9)
    pub level: u32,
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl DeflateCodec {
    /// Create new zlib codec with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Compress bytes to a zlib stream
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Level::new(self.level.min(9)));
        encoder
            .write_all(data)
            .map_err(|e| GlpiError::Compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| GlpiError::Compression(e.to_string()))
    }

    /// Inflate a zlib stream.
    ///
    /// The stream must reach its end marker: a truncated body is an error,
    /// never a partial buffer.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut inflater = Decompress::new(true);
        let mut out = Vec::with_capacity(data.len().saturating_mul(4).max(1024));

        loop {
            if out.len() == out.capacity() {
                out.reserve(out.capacity().max(1024));
            }

            let before_in = inflater.total_in();
            let before_out = inflater.total_out();
            let offset = usize::try_from(before_in).map_or(data.len(), |n| n.min(data.len()));

            let status = inflater
                .decompress_vec(&data[offset..], &mut out, FlushDecompress::None)
                .map_err(|e| GlpiError::Decompression(format!("zlib: {e}")))?;

            if matches!(status, Status::StreamEnd) {
                return Ok(out);
            }
            // Output space was available, so no progress means input ran out
            if inflater.total_in() == before_in && inflater.total_out() == before_out {
                return Err(GlpiError::Decompression(
                    "zlib: truncated stream".to_string(),
                ));
            }
        }
    }

    /// Inflate a gzip member
    pub fn gunzip(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decompressed = Vec::new();
        GzDecoder::new(data)
            .read_to_end(&mut decompressed)
            .map_err(|e| GlpiError::Decompression(format!("gzip: {e}")))?;
        Ok(decompressed)
    }
}
