use std::path::Path;

use anyhow::Context as _;

use crate::encode::format::OutputFormat;
use crate::foundation::error::ReelResult;

/// Finished, immutable render output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureArtifact {
    bytes: Vec<u8>,
    mime_type: String,
}

impl CaptureArtifact {
    /// Concatenate `segments` in arrival order.
    pub fn from_segments(segments: Vec<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        let len = segments.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(len);
        for s in segments {
            bytes.extend_from_slice(&s);
        }
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// MIME type of the encoding.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Byte length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes were produced.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Suggested file extension (`webm`, `mp4`, `raw`); `bin` for unknown types.
    pub fn extension(&self) -> &'static str {
        match OutputFormat::from_mime(&self.mime_type) {
            Some(f) => f.extension(),
            None if self.mime_type.starts_with("video/webm") => "webm",
            None if self.mime_type.starts_with("video/mp4") => "mp4",
            None => "bin",
        }
    }

    /// Write the bytes to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> ReelResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write artifact '{}'", path.display()))?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), mime = %self.mime_type, "artifact written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/artifact.rs"]
mod tests;
