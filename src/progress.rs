use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

/// Receives progress and log lines from a running operation.
///
/// Both methods default to doing nothing, so an observer only implements
/// what it renders.
pub trait ProgressObserver {
    /// Called once per attempted item with a 1-based `current`.
    fn on_progress(&self, _current: usize, _total: usize, _message: &str) {}

    /// Called with a human readable status line.
    fn on_log(&self, _message: &str) {}
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// Owned form of an observer callback, for shipping across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    Log(String),
}

impl ProgressObserver for mpsc::Sender<ProgressEvent> {
    fn on_progress(&self, current: usize, total: usize, message: &str) {
        // The receiver going away only means nobody is watching anymore.
        let _ = self.send(ProgressEvent::Progress {
            current,
            total,
            message: message.to_string(),
        });
    }

    fn on_log(&self, message: &str) {
        let _ = self.send(ProgressEvent::Log(message.to_string()));
    }
}

/// Cooperative cancellation flag shared between a worker and its controller.
#[derive(Debug, Default, Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
