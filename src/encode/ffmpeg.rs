use std::io::{Read, Write as _};
use std::process::{ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crossbeam_channel::Sender;

use crate::encode::encoder::{EncoderConfig, EncoderEvent, RecorderState, VideoEncoder};
use crate::encode::format::OutputFormat;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::color::premul_over_opaque;
use crate::render::surface::FrameRGBA;

const STDOUT_CHUNK: usize = 64 * 1024;

/// Encoder backed by the system `ffmpeg` binary.
///
/// Raw RGBA frames go to stdin; the muxed stream is read from stdout and forwarded as
/// [`EncoderEvent::DataAvailable`] chunks by a supervisor thread, which also reports the final
/// [`EncoderEvent::Stopped`] or [`EncoderEvent::Error`] once the process exits.
pub struct FfmpegEncoder {
    state: RecorderState,
    cfg: Option<EncoderConfig>,
    stdin: Option<ChildStdin>,
    supervisor: Option<JoinHandle<()>>,
    scratch: Vec<u8>,
    mime: &'static str,
}

impl FfmpegEncoder {
    /// Encoder that has not been started.
    pub fn new() -> Self {
        Self {
            state: RecorderState::Inactive,
            cfg: None,
            stdin: None,
            supervisor: None,
            scratch: Vec::new(),
            mime: OutputFormat::BASELINE.mime_type(),
        }
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FfmpegEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegEncoder")
            .field("state", &self.state)
            .field("mime", &self.mime)
            .finish_non_exhaustive()
    }
}

/// Full ffmpeg argument list for streaming `cfg` from stdin to stdout.
pub(crate) fn ffmpeg_args(cfg: &EncoderConfig) -> ReelResult<Vec<String>> {
    let codec = cfg.format.ffmpeg_codec().ok_or_else(|| {
        ReelError::configuration(format!("ffmpeg cannot produce '{}'", cfg.format))
    })?;

    // Input: raw RGBA8 frames, already flattened to opaque. `-r` before `-i` sets the input rate.
    let mut args: Vec<String> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.push(format!("{}x{}", cfg.width, cfg.height));
    args.push("-r".into());
    args.push(format!("{}/{}", cfg.fps.num, cfg.fps.den));
    args.extend(["-i", "pipe:0", "-an", "-c:v", codec, "-pix_fmt", "yuv420p"].map(String::from));

    let tail: &[&str] = match cfg.format {
        OutputFormat::WebmVp9 => &["-deadline", "realtime", "-b:v", "0", "-crf", "32", "-f", "webm"],
        OutputFormat::Webm => &["-deadline", "realtime", "-b:v", "4M", "-f", "webm"],
        // Non-seekable output: fragmented MP4 so data can stream out incrementally.
        OutputFormat::Mp4Avc1 => &[
            "-preset",
            "veryfast",
            "-movflags",
            "frag_keyframe+empty_moov+default_base_moof",
            "-f",
            "mp4",
        ],
        OutputFormat::RawRgba => &[],
    };
    args.extend(tail.iter().map(|s| s.to_string()));
    args.push("pipe:1".into());
    Ok(args)
}

fn validate(cfg: &EncoderConfig) -> ReelResult<()> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(ReelError::configuration("fps must be non-zero"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(ReelError::configuration(
            "ffmpeg encoder width/height must be non-zero",
        ));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(ReelError::configuration(
            "ffmpeg encoder width/height must be even (required for yuv420p output)",
        ));
    }
    Ok(())
}

impl VideoEncoder for FfmpegEncoder {
    #[tracing::instrument(level = "info", skip(self, events), fields(format = %cfg.format))]
    fn start(&mut self, cfg: &EncoderConfig, events: Sender<EncoderEvent>) -> ReelResult<()> {
        if self.state == RecorderState::Recording {
            return Err(ReelError::state("ffmpeg encoder is already recording"));
        }
        validate(cfg)?;
        let args = ffmpeg_args(cfg)?;

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReelError::encoding(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok::<_, std::io::Error>(stderr_bytes)
        });

        let supervisor = std::thread::spawn(move || {
            let mut buf = vec![0u8; STDOUT_CHUNK];
            let read_result = loop {
                match stdout.read(&mut buf) {
                    Ok(0) => break Ok(()),
                    Ok(n) => {
                        // Receiver gone means the render was abandoned; keep draining.
                        let _ = events.send(EncoderEvent::DataAvailable(buf[..n].to_vec()));
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(e) => break Err(e),
                }
            };

            let status = child.wait();
            let stderr_bytes = match stderr_drain.join() {
                Ok(Ok(bytes)) => bytes,
                _ => Vec::new(),
            };
            let event = match (read_result, status) {
                (Err(e), _) => EncoderEvent::Error(format!("ffmpeg stdout read failed: {e}")),
                (_, Err(e)) => EncoderEvent::Error(format!("failed to wait for ffmpeg: {e}")),
                (Ok(()), Ok(status)) if !status.success() => EncoderEvent::Error(format!(
                    "ffmpeg exited with status {}: {}",
                    status,
                    String::from_utf8_lossy(&stderr_bytes).trim()
                )),
                (Ok(()), Ok(_)) => EncoderEvent::Stopped,
            };
            let _ = events.send(event);
        });

        self.scratch = vec![0u8; cfg.frame_len()];
        self.stdin = Some(stdin);
        self.supervisor = Some(supervisor);
        self.mime = cfg.format.mime_type();
        self.cfg = Some(*cfg);
        self.state = RecorderState::Recording;
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = match (&self.cfg, self.state) {
            (Some(cfg), RecorderState::Recording) => cfg,
            _ => return Err(ReelError::encoding("ffmpeg encoder is not recording")),
        };
        cfg.check_frame(frame)?;

        let bg = [cfg.background.r, cfg.background.g, cfg.background.b, 255];
        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, bg)?;
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encoding("ffmpeg encoder is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            ReelError::encoding(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn request_stop(&mut self) -> ReelResult<()> {
        if self.state == RecorderState::Inactive {
            return Ok(());
        }
        self.state = RecorderState::Inactive;
        // Closing stdin lets ffmpeg flush; the supervisor reports completion.
        drop(self.stdin.take());
        tracing::debug!("ffmpeg stdin closed");
        Ok(())
    }

    fn state(&self) -> RecorderState {
        self.state
    }

    fn mime_type(&self) -> &str {
        self.mime
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        // Detach: the supervisor exits on its own once ffmpeg sees EOF.
        drop(self.supervisor.take());
    }
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::encoding(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [bg_rgba[0], bg_rgba[1], bg_rgba[2]];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        d.copy_from_slice(&premul_over_opaque([s[0], s[1], s[2], s[3]], bg));
    }

    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
