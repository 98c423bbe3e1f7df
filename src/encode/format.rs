use crate::encode::capability::CaptureCapabilities;

/// Encoded output produced by the capture pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OutputFormat {
    /// VP9 in WebM.
    WebmVp9,
    /// H.264 in fragmented MP4.
    Mp4Avc1,
    /// VP8 in WebM; the always-accepted baseline.
    Webm,
    /// Uncompressed RGBA8 frames, concatenated (in-memory encoders).
    RawRgba,
}

impl OutputFormat {
    /// Encoded formats in descending preference. The last entry is the baseline.
    pub const PREFERENCE: [Self; 3] = [Self::WebmVp9, Self::Mp4Avc1, Self::Webm];

    /// Baseline format accepted without a capability query.
    pub const BASELINE: Self = Self::Webm;

    /// MIME type tagged onto artifacts of this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::WebmVp9 => "video/webm;codecs=vp9",
            Self::Mp4Avc1 => "video/mp4;codecs=avc1",
            Self::Webm => "video/webm",
            Self::RawRgba => "video/x-raw",
        }
    }

    /// File extension for artifacts of this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::WebmVp9 | Self::Webm => "webm",
            Self::Mp4Avc1 => "mp4",
            Self::RawRgba => "raw",
        }
    }

    /// Parse a MIME type previously produced by [`OutputFormat::mime_type`].
    ///
    /// Parameters are compared without whitespace; an unknown codec parameter is rejected.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let normalized: String = mime.chars().filter(|c| !c.is_whitespace()).collect();
        let normalized = normalized.to_ascii_lowercase();
        [Self::WebmVp9, Self::Mp4Avc1, Self::Webm, Self::RawRgba]
            .into_iter()
            .find(|f| f.mime_type() == normalized)
    }

    /// Name of the ffmpeg video encoder backing this format, if any.
    pub fn ffmpeg_codec(self) -> Option<&'static str> {
        match self {
            Self::WebmVp9 => Some("libvpx-vp9"),
            Self::Mp4Avc1 => Some("libx264"),
            Self::Webm => Some("libvpx"),
            Self::RawRgba => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Pick the most preferred format the host supports, falling back to the baseline.
#[tracing::instrument(level = "debug", skip(caps), ret)]
pub fn select_format(caps: &dyn CaptureCapabilities) -> OutputFormat {
    OutputFormat::PREFERENCE
        .into_iter()
        .find(|&f| f == OutputFormat::BASELINE || caps.supports(f))
        .unwrap_or(OutputFormat::BASELINE)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/format.rs"]
mod tests;
