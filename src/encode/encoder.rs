use crossbeam_channel::Sender;

use crate::encode::format::OutputFormat;
use crate::foundation::core::{Fps, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::FrameRGBA;

/// Signal emitted by an encoder while recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncoderEvent {
    /// A chunk of encoded output. May arrive at any point during recording.
    DataAvailable(Vec<u8>),
    /// Encoding finished after a stop request; no more data follows.
    Stopped,
    /// Encoding failed; no more data follows.
    Error(String),
}

/// Encoder lifecycle: `Inactive -> Recording -> Inactive`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecorderState {
    /// Not started, or a stop was requested.
    #[default]
    Inactive,
    /// Accepting frames.
    Recording,
}

/// Parameters handed to [`VideoEncoder::start`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncoderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Sampling rate of the capture stream.
    pub fps: Fps,
    /// Requested output format.
    pub format: OutputFormat,
    /// Background used to flatten any residual alpha.
    pub background: Rgba8,
}

impl EncoderConfig {
    pub(crate) fn frame_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    pub(crate) fn check_frame(&self, frame: &FrameRGBA) -> ReelResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(ReelError::encoding(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != self.frame_len() {
            return Err(ReelError::encoding(
                "frame.data size mismatch with width*height*4",
            ));
        }
        Ok(())
    }
}

/// Incremental video encoder fed with captured frames.
///
/// Encoded output and terminal signals are delivered on the `events` channel passed to
/// [`VideoEncoder::start`]. After a stop request the encoder must eventually send exactly one
/// of [`EncoderEvent::Stopped`] or [`EncoderEvent::Error`].
pub trait VideoEncoder: Send {
    /// Begin recording.
    fn start(
        &mut self,
        cfg: &EncoderConfig,
        events: Sender<EncoderEvent>,
    ) -> ReelResult<()>;
    /// Encode one frame. Only valid while recording.
    fn push_frame(&mut self, frame: &FrameRGBA) -> ReelResult<()>;
    /// Ask the encoder to flush and finish. The state becomes `Inactive` immediately.
    fn request_stop(&mut self) -> ReelResult<()>;
    /// Current lifecycle state.
    fn state(&self) -> RecorderState;
    /// MIME type of the produced bytes. Valid after `start`.
    fn mime_type(&self) -> &str;
}

/// Encoder that emits raw RGBA8 frames as data segments. Does not spawn anything.
///
/// Frames are batched into segments of `frames_per_segment`; the remainder is flushed on stop.
#[derive(Debug)]
pub struct MemoryEncoder {
    frames_per_segment: usize,
    state: RecorderState,
    cfg: Option<EncoderConfig>,
    events: Option<Sender<EncoderEvent>>,
    pending: Vec<u8>,
    pending_frames: usize,
}

impl MemoryEncoder {
    /// Encoder emitting one segment per `frames_per_segment` frames (at least one).
    pub fn new(frames_per_segment: usize) -> Self {
        Self {
            frames_per_segment: frames_per_segment.max(1),
            state: RecorderState::Inactive,
            cfg: None,
            events: None,
            pending: Vec::new(),
            pending_frames: 0,
        }
    }

    fn flush(&mut self) {
        if let Some(tx) = &self.events {
            let _ = tx.send(EncoderEvent::DataAvailable(std::mem::take(&mut self.pending)));
        }
        self.pending_frames = 0;
    }
}

impl Default for MemoryEncoder {
    fn default() -> Self {
        Self::new(8)
    }
}

impl VideoEncoder for MemoryEncoder {
    fn start(&mut self, cfg: &EncoderConfig, events: Sender<EncoderEvent>) -> ReelResult<()> {
        if self.state == RecorderState::Recording {
            return Err(ReelError::state("memory encoder is already recording"));
        }
        self.cfg = Some(*cfg);
        self.events = Some(events);
        self.pending.clear();
        self.pending_frames = 0;
        self.state = RecorderState::Recording;
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = match (&self.cfg, self.state) {
            (Some(cfg), RecorderState::Recording) => cfg,
            _ => return Err(ReelError::encoding("memory encoder is not recording")),
        };
        cfg.check_frame(frame)?;
        self.pending.extend_from_slice(&frame.data);
        self.pending_frames += 1;
        if self.pending_frames >= self.frames_per_segment {
            self.flush();
        }
        Ok(())
    }

    fn request_stop(&mut self) -> ReelResult<()> {
        if self.state == RecorderState::Inactive {
            return Ok(());
        }
        self.state = RecorderState::Inactive;
        if self.pending_frames > 0 {
            self.flush();
        }
        if let Some(tx) = self.events.take() {
            let _ = tx.send(EncoderEvent::Stopped);
        }
        Ok(())
    }

    fn state(&self) -> RecorderState {
        self.state
    }

    fn mime_type(&self) -> &str {
        OutputFormat::RawRgba.mime_type()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encoder.rs"]
mod tests;
