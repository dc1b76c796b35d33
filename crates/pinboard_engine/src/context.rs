use std::sync::{mpsc, Arc};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::EngineEvent;

/// The operator asked the run to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cancelled")]
pub struct Cancelled;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Appends events to an unbounded queue; delivery to an interactive thread is
/// the receiver's business.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Gate that holds progress between steps while paused.
///
/// Waiters wake as soon as the gate opens or the run is cancelled; in-flight
/// work is never interrupted.
#[derive(Debug, Clone)]
pub struct PauseGate {
    paused: Arc<watch::Sender<bool>>,
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PauseGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            paused: Arc::new(tx),
        }
    }

    /// Returns `true` if the gate was open.
    pub fn pause(&self) -> bool {
        self.paused.send_if_modified(|paused| !std::mem::replace(paused, true))
    }

    /// Returns `true` if the gate was closed.
    pub fn resume(&self) -> bool {
        self.paused.send_if_modified(|paused| std::mem::replace(paused, false))
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    pub async fn wait_until_resumed(&self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        let mut rx = self.paused.subscribe();
        loop {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            if !*rx.borrow_and_update() {
                return Ok(());
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Cancelled),
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Per-run control surface handed to the scanner and downloader.
#[derive(Clone)]
pub struct RunContext {
    cancel: CancellationToken,
    gate: PauseGate,
    sink: Arc<dyn ProgressSink>,
}

impl RunContext {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            cancel: CancellationToken::new(),
            gate: PauseGate::new(),
            sink,
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn gate(&self) -> &PauseGate {
        &self.gate
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn emit(&self, event: EngineEvent) {
        self.sink.emit(event);
    }

    pub fn status(&self, text: impl Into<String>) {
        self.sink.emit(EngineEvent::Status(text.into()));
    }

    /// Loop-top check: blocks while paused, fails once cancelled.
    pub async fn checkpoint(&self) -> Result<(), Cancelled> {
        self.gate.wait_until_resumed(&self.cancel).await
    }

    pub async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        if self.cancel.is_cancelled() {
            return Err(Cancelled);
        }
        if duration.is_zero() {
            return Ok(());
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}
