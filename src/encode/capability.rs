use std::collections::BTreeSet;
use std::process::{Command, Stdio};

use crate::encode::format::OutputFormat;

/// Host capability provider queried once per render.
pub trait CaptureCapabilities: Send + Sync {
    /// Whether the host can capture the drawing surface at all.
    fn capture_supported(&self) -> bool;
    /// Whether `format` can be encoded.
    fn supports(&self, format: OutputFormat) -> bool;
}

/// Capabilities of the system `ffmpeg` binary.
///
/// Capture counts as supported only when the baseline format's encoder is listed, since
/// format selection falls back to it without asking.
#[derive(Clone, Debug, Default)]
pub struct FfmpegCapabilities {
    available: bool,
    encoders: BTreeSet<String>,
}

impl FfmpegCapabilities {
    /// Run `ffmpeg -encoders` once and record what it reports.
    ///
    /// A missing or failing binary yields "capture unsupported".
    pub fn probe() -> Self {
        let output = Command::new("ffmpeg")
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match output {
            Ok(out) if out.status.success() => {
                let caps = Self::from_encoder_listing(&String::from_utf8_lossy(&out.stdout));
                tracing::debug!(encoders = caps.encoders.len(), "ffmpeg probed");
                if !caps.capture_supported() {
                    tracing::warn!("ffmpeg lacks the baseline webm encoder; capture disabled");
                }
                caps
            }
            Ok(out) => {
                tracing::warn!(status = %out.status, "ffmpeg -encoders failed; capture disabled");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "ffmpeg not found on PATH; capture disabled");
                Self::default()
            }
        }
    }

    /// Build from the text of `ffmpeg -encoders`.
    ///
    /// Only video encoder rows (flags starting with `V`) after the `------` separator count.
    pub fn from_encoder_listing(listing: &str) -> Self {
        let mut encoders = BTreeSet::new();
        let mut in_table = false;
        for line in listing.lines() {
            let line = line.trim();
            if !in_table {
                in_table = line.starts_with("------");
                continue;
            }
            let mut cols = line.split_whitespace();
            let (Some(flags), Some(name)) = (cols.next(), cols.next()) else {
                continue;
            };
            if flags.len() == 6 && flags.starts_with('V') {
                encoders.insert(name.to_owned());
            }
        }
        Self {
            available: true,
            encoders,
        }
    }

    /// Whether ffmpeg lists a video encoder named `name`.
    pub fn has_encoder(&self, name: &str) -> bool {
        self.encoders.contains(name)
    }
}

impl CaptureCapabilities for FfmpegCapabilities {
    fn capture_supported(&self) -> bool {
        self.available
            && OutputFormat::BASELINE
                .ffmpeg_codec()
                .is_some_and(|codec| self.has_encoder(codec))
    }

    fn supports(&self, format: OutputFormat) -> bool {
        self.available
            && format
                .ffmpeg_codec()
                .is_some_and(|codec| self.has_encoder(codec))
    }
}

/// Fixed capabilities, for tests and embedders that know their host.
#[derive(Clone, Debug)]
pub struct StaticCapabilities {
    supported: bool,
    formats: Vec<OutputFormat>,
}

impl StaticCapabilities {
    /// Capture supported, with exactly `formats` encodable.
    pub fn supporting(formats: &[OutputFormat]) -> Self {
        Self {
            supported: true,
            formats: formats.to_vec(),
        }
    }

    /// Capture supported with every format encodable.
    pub fn all() -> Self {
        Self::supporting(&[
            OutputFormat::WebmVp9,
            OutputFormat::Mp4Avc1,
            OutputFormat::Webm,
            OutputFormat::RawRgba,
        ])
    }

    /// Capture unsupported.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            formats: Vec::new(),
        }
    }
}

impl CaptureCapabilities for StaticCapabilities {
    fn capture_supported(&self) -> bool {
        self.supported
    }

    fn supports(&self, format: OutputFormat) -> bool {
        self.supported && self.formats.contains(&format)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/capability.rs"]
mod tests;
