//! One-shot shutdown latch shared by the quit key and the interrupt handler

use tokio::sync::watch;
use tracing::info;

/// What started the shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// `q` pressed on the dashboard
    QuitKey,
    /// SIGINT, or Ctrl+C read as a key while the terminal is in raw mode
    Interrupt,
    /// The dashboard loop failed and can no longer render
    UiFailure,
}

/// Latch that fires at most once
///
/// Any number of triggers may race; only the first one records a reason.
/// Teardown waits on `wait()` and therefore runs once.
pub struct ShutdownLatch {
    tx: watch::Sender<Option<ShutdownReason>>,
}

impl Default for ShutdownLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownLatch {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Fire the latch; returns true only for the call that fired it
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        let fired = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
        if fired {
            info!(reason = ?reason, "shutdown_triggered");
        }
        fired
    }

    pub fn is_triggered(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Block until the latch fires and return the winning reason
    pub async fn wait(&self) -> ShutdownReason {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(reason) = *rx.borrow_and_update() {
                return reason;
            }
            // Sender is owned by self, so the channel stays open while we wait
            let _ = rx.changed().await;
        }
    }
}
