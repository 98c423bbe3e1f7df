use crossbeam_channel::{Receiver, TryRecvError};

use crate::encode::encoder::{EncoderConfig, EncoderEvent, RecorderState, VideoEncoder};
use crate::encode::stream::CapturedFrame;
use crate::foundation::error::{ReelError, ReelResult};

/// Drives one encoder through a recording and accumulates its output.
///
/// Segments are kept in arrival order; zero-length segments are skipped. An error signal makes
/// every later call fail with the same message and discards accumulated data.
pub(crate) struct Recorder {
    encoder: Box<dyn VideoEncoder>,
    events: Receiver<EncoderEvent>,
    segments: Vec<Vec<u8>>,
    stopped: bool,
    failure: Option<String>,
    frames_pushed: u64,
}

/// Output of a finalized recording.
#[derive(Debug)]
pub(crate) struct Finalized {
    pub(crate) segments: Vec<Vec<u8>>,
    pub(crate) mime_type: String,
}

impl Recorder {
    #[tracing::instrument(level = "debug", skip(encoder), fields(format = %cfg.format))]
    pub(crate) fn start(mut encoder: Box<dyn VideoEncoder>, cfg: &EncoderConfig) -> ReelResult<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        encoder.start(cfg, tx).map_err(|e| match e {
            ReelError::Encoding(_) | ReelError::Configuration(_) | ReelError::State(_) => e,
            other => ReelError::encoding(other.to_string()),
        })?;
        Ok(Self {
            encoder,
            events: rx,
            segments: Vec::new(),
            stopped: false,
            failure: None,
            frames_pushed: 0,
        })
    }

    pub(crate) fn state(&self) -> RecorderState {
        self.encoder.state()
    }

    pub(crate) fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub(crate) fn frames_pushed(&self) -> u64 {
        self.frames_pushed
    }

    /// Feed a captured snapshot, once per tick it covers.
    pub(crate) fn push(&mut self, captured: &CapturedFrame) -> ReelResult<()> {
        self.check_failed()?;
        for _ in captured.ticks.clone() {
            self.encoder.push_frame(&captured.frame).map_err(to_encoding)?;
            self.frames_pushed += 1;
        }
        Ok(())
    }

    /// Drain pending encoder signals without blocking.
    pub(crate) fn pump(&mut self) -> ReelResult<()> {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.handle(event)?,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.check_failed()
    }

    /// Request the encoder to stop; a no-op once it is inactive.
    pub(crate) fn stop(&mut self) -> ReelResult<()> {
        if self.encoder.state() == RecorderState::Inactive {
            return Ok(());
        }
        self.encoder.request_stop().map_err(to_encoding)
    }

    /// Block until the encoder signals it stopped, returning all segments.
    pub(crate) fn finalize(mut self) -> ReelResult<Finalized> {
        self.stop()?;
        while !self.stopped {
            self.check_failed()?;
            match self.events.recv() {
                Ok(event) => self.handle(event)?,
                Err(_) => {
                    return Err(ReelError::encoding(
                        "encoder went away without signalling stop",
                    ));
                }
            }
        }
        // Anything queued behind `Stopped` still belongs to the recording.
        self.pump()?;
        Ok(Finalized {
            mime_type: self.encoder.mime_type().to_owned(),
            segments: self.segments,
        })
    }

    /// Stop without waiting and discard everything recorded.
    pub(crate) fn abort(mut self) {
        if let Err(e) = self.stop() {
            tracing::debug!(error = %e, "encoder stop during abort failed");
        }
        self.segments.clear();
    }

    fn handle(&mut self, event: EncoderEvent) -> ReelResult<()> {
        match event {
            EncoderEvent::DataAvailable(bytes) => {
                if !bytes.is_empty() {
                    self.segments.push(bytes);
                }
            }
            EncoderEvent::Stopped => self.stopped = true,
            EncoderEvent::Error(msg) => {
                tracing::error!(error = %msg, "encoder reported an error");
                self.segments.clear();
                self.failure = Some(msg);
            }
        }
        self.check_failed()
    }

    fn check_failed(&self) -> ReelResult<()> {
        match &self.failure {
            Some(msg) => Err(ReelError::encoding(msg.clone())),
            None => Ok(()),
        }
    }
}

fn to_encoding(e: ReelError) -> ReelError {
    match e {
        ReelError::Encoding(_) => e,
        other => ReelError::encoding(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/recorder.rs"]
mod tests;
