use crate::models::progress_types::ProgressEvent;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Create a connected sender/receiver pair.
///
/// The queue is unbounded so the worker never waits on a slow observer.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, ProgressReceiver { rx })
}

#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    /// Queue an event. Dropped silently once the observer is gone.
    pub fn send(&self, event: ProgressEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Progress observer gone, event dropped");
        }
    }

    pub fn log(&self, text: impl Into<String>) {
        self.send(ProgressEvent::log(text));
    }

    pub fn status(&self, text: impl Into<String>) {
        self.send(ProgressEvent::status(text));
    }

    pub fn progress(&self, current: usize, total: usize) {
        self.send(ProgressEvent::Progress { current, total });
    }
}

pub struct ProgressReceiver {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Take everything queued right now without waiting.
    pub fn drain(&mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Block until the next event. `None` once every sender is dropped.
    ///
    /// Must not be called from inside an async runtime.
    pub fn recv_blocking(&mut self) -> Option<ProgressEvent> {
        self.rx.blocking_recv()
    }
}
