//! Diagnostic and result sink.
//!
//! Classifiers are producers: they push [`SinkMessage`]s into an unbounded
//! channel and never wait on the consumer. The consumer side
//! ([`SinkReceiver`]) is owned by whoever persists or displays results.
//!
//! Every message is mirrored to `tracing` so a process without a consumer
//! still logs what happened.

use crate::result::ScanResult;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Severity tier of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticLevel {
    /// Fine-grained trace (skipped files, unreadable containers, I/O failures)
    Trace,
    /// Operator-facing error (misconfiguration, unexpected failures)
    Error,
}

/// A free-text diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity tier
    pub level: DiagnosticLevel,
    /// Message text
    pub message: String,
}

/// Everything a classifier can emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkMessage {
    /// Trace or error event
    Diagnostic(Diagnostic),
    /// Confirmed match
    Result(ScanResult),
}

/// Create a connected producer/consumer pair.
#[must_use]
pub fn channel() -> (Sink, SinkReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sink { tx }, SinkReceiver { rx })
}

/// Producer handle. Cheap to clone; one per classifier or worker.
#[derive(Debug, Clone)]
pub struct Sink {
    tx: UnboundedSender<SinkMessage>,
}

impl Sink {
    /// Emit a fine-grained trace diagnostic.
    pub fn trace(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(target: "trawl::sink", "{}", message);
        self.send(SinkMessage::Diagnostic(Diagnostic {
            level: DiagnosticLevel::Trace,
            message,
        }));
    }

    /// Emit an operator-facing error diagnostic.
    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(target: "trawl::sink", "{}", message);
        self.send(SinkMessage::Diagnostic(Diagnostic {
            level: DiagnosticLevel::Error,
            message,
        }));
    }

    /// Emit a match.
    pub fn result(&self, result: ScanResult) {
        info!(
            target: "trawl::sink",
            rule = %result.rule_name,
            triage = %result.triage,
            object = %result.descriptor,
            "match"
        );
        self.send(SinkMessage::Result(result));
    }

    fn send(&self, message: SinkMessage) {
        // A dropped consumer must not stall or fail producers.
        if self.tx.send(message).is_err() {
            debug!(target: "trawl::sink", "sink consumer closed, message dropped");
        }
    }
}

/// Consumer handle.
#[derive(Debug)]
pub struct SinkReceiver {
    rx: UnboundedReceiver<SinkMessage>,
}

impl SinkReceiver {
    /// Wait for the next message. Returns `None` once every [`Sink`] is
    /// dropped and the queue is empty.
    pub async fn recv(&mut self) -> Option<SinkMessage> {
        self.rx.recv().await
    }

    /// Take the next queued message without waiting.
    pub fn try_recv(&mut self) -> Option<SinkMessage> {
        match self.rx.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Take every message queued right now.
    pub fn drain(&mut self) -> Vec<SinkMessage> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Drain loop: hand each message to `handler` until all producers are gone.
    pub async fn run<F>(mut self, mut handler: F)
    where
        F: FnMut(SinkMessage),
    {
        while let Some(message) = self.rx.recv().await {
            handler(message);
        }
    }
}

/// Split messages into results and diagnostics, preserving order.
#[must_use]
pub fn partition(messages: Vec<SinkMessage>) -> (Vec<ScanResult>, Vec<Diagnostic>) {
    let mut results = Vec::new();
    let mut diagnostics = Vec::new();
    for message in messages {
        match message {
            SinkMessage::Result(result) => results.push(result),
            SinkMessage::Diagnostic(diagnostic) => diagnostics.push(diagnostic),
        }
    }
    (results, diagnostics)
}
