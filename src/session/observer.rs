//! Fire-and-forget notifications for the caller's UI.

use std::sync::atomic::{AtomicI64, Ordering};

use crossbeam_channel::{Receiver, Sender};

use crate::session::status::RenderStatus;

/// Receives status, progress and error notifications. Never awaited by the engine.
pub trait RenderObserver: Send + Sync {
    /// Status changed.
    fn on_status(&self, status: RenderStatus);
    /// A frame was drawn; `progress` is in `[0, 1]` and never decreases within a render.
    fn on_progress(&self, progress: f64);
    /// A render (or render request) failed.
    fn on_error(&self, message: &str);
}

/// One observer notification as a value.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
    /// See [`RenderObserver::on_status`].
    Status(RenderStatus),
    /// See [`RenderObserver::on_progress`].
    Progress(f64),
    /// See [`RenderObserver::on_error`].
    Error(String),
}

/// Forwards notifications over a channel.
#[derive(Clone, Debug)]
pub struct ChannelObserver {
    tx: Sender<RenderEvent>,
}

impl ChannelObserver {
    /// Observer plus the receiving end of its unbounded channel.
    pub fn new() -> (Self, Receiver<RenderEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl RenderObserver for ChannelObserver {
    fn on_status(&self, status: RenderStatus) {
        let _ = self.tx.send(RenderEvent::Status(status));
    }

    fn on_progress(&self, progress: f64) {
        let _ = self.tx.send(RenderEvent::Progress(progress));
    }

    fn on_error(&self, message: &str) {
        let _ = self.tx.send(RenderEvent::Error(message.to_owned()));
    }
}

/// Logs notifications through `tracing`; progress at every 10% step.
#[derive(Debug)]
pub struct TracingObserver {
    last_decile: AtomicI64,
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self {
            last_decile: AtomicI64::new(-1),
        }
    }
}

impl RenderObserver for TracingObserver {
    fn on_status(&self, status: RenderStatus) {
        if status == RenderStatus::Idle {
            self.last_decile.store(-1, Ordering::Relaxed);
        }
        tracing::info!(status = %status, "render status");
    }

    fn on_progress(&self, progress: f64) {
        let decile = (progress.clamp(0.0, 1.0) * 10.0).floor() as i64;
        if self.last_decile.fetch_max(decile, Ordering::Relaxed) < decile {
            tracing::info!(percent = decile * 10, "render progress");
        }
    }

    fn on_error(&self, message: &str) {
        tracing::error!(error = %message, "render failed");
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl RenderObserver for NoopObserver {
    fn on_status(&self, _status: RenderStatus) {}
    fn on_progress(&self, _progress: f64) {}
    fn on_error(&self, _message: &str) {}
}

#[cfg(test)]
#[path = "../../tests/unit/session/observer.rs"]
mod tests;
