//! External gzip codec (CompressionMode::GzipExternalProcess).
//!
//! For hosts built without native deflate. Input goes to a private
//! temporary file, `gzip -c <file>` (or `gzip -dc <file>`) is spawned with
//! an explicit argument list, and its standard output is read in full.
//! The temporary file is removed when the guard drops, on every path.

use std::ffi::OsString;
use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;

use crate::error::{GlpiError, Result};

/// Default executable looked up in `PATH`
pub const DEFAULT_GZIP_COMMAND: &str = "gzip";

/// Codec that pipes data through an external `gzip` process
#[derive(Debug, Clone)]
pub struct GzipCommand {
    program: OsString,
}

impl Default for GzipCommand {
    fn default() -> Self {
        Self::new(DEFAULT_GZIP_COMMAND)
    }
}

impl GzipCommand {
    /// Use the given executable (name looked up in `PATH`, or a full path)
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Executable this codec spawns
    pub fn program(&self) -> &std::ffi::OsStr {
        &self.program
    }

    /// Check whether the executable can be run on this host
    pub fn is_runnable(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    /// Compress bytes with `gzip -c`
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.run(&["-c"], data, true).map_err(GlpiError::Compression)
    }

    /// Decompress a gzip stream with `gzip -dc`
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.run(&["-dc"], data, false)
            .map_err(GlpiError::Decompression)
    }

    // A gzip stream always carries a header, so empty stdout on compression
    // means the process failed. An empty member legitimately inflates to nothing.
    fn run(
        &self,
        flags: &[&str],
        data: &[u8],
        require_output: bool,
    ) -> std::result::Result<Vec<u8>, String> {
        let mut scratch = tempfile::Builder::new()
            .prefix("glpi-")
            .tempfile()
            .map_err(|e| format!("failed to create temporary file: {e}"))?;
        write_scratch(&mut scratch, data)
            .map_err(|e| format!("failed to write temporary file: {e}"))?;

        tracing::trace!(
            "Running {:?} {:?} {}",
            self.program,
            flags,
            scratch.path().display()
        );

        let output = Command::new(&self.program)
            .args(flags)
            .arg(scratch.path())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| format!("failed to spawn {:?}: {e}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{:?} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            ));
        }
        if require_output && output.stdout.is_empty() {
            return Err(format!("{:?} produced no output", self.program));
        }

        Ok(output.stdout)
    }
}

fn write_scratch(scratch: &mut NamedTempFile, data: &[u8]) -> std::io::Result<()> {
    scratch.write_all(data)?;
    scratch.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable_is_not_runnable() {
        let gzip = GzipCommand::new("/nonexistent/glpi-test-gzip");
        assert!(!gzip.is_runnable());
    }

    #[test]
    fn test_missing_executable_fails_compression() {
        let gzip = GzipCommand::new("/nonexistent/glpi-test-gzip");
        let result = gzip.compress(b"<REQUEST/>");
        assert!(matches!(result, Err(GlpiError::Compression(_))));
    }

    #[test]
    fn test_missing_executable_fails_decompression() {
        let gzip = GzipCommand::new("/nonexistent/glpi-test-gzip");
        let result = gzip.decompress(&[0x1f, 0x8b, 0x08]);
        assert!(matches!(result, Err(GlpiError::Decompression(_))));
    }

    #[test]
    fn test_roundtrip_when_available() {
        let gzip = GzipCommand::default();
        if !gzip.is_runnable() {
            return;
        }

        let envelope = b"<REQUEST><QUERY>INVENTORY</QUERY></REQUEST>";
        let compressed = gzip.compress(envelope).unwrap();
        assert_eq!(&compressed[..3], &[0x1f, 0x8b, 0x08]);

        let decompressed = gzip.decompress(&compressed).unwrap();
        assert_eq!(decompressed, envelope);
    }

    #[test]
    fn test_corrupt_input_fails_when_available() {
        let gzip = GzipCommand::default();
        if !gzip.is_runnable() {
            return;
        }

        let result = gzip.decompress(b"definitely not gzip");
        assert!(matches!(result, Err(GlpiError::Decompression(_))));
    }
}
