// src/shutdown.rs
// Cooperative cancellation shared between the binary and the probe loop.
use tokio::sync::watch;

/// Creates a connected trigger/signal pair.
pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Fires the signal. Subsequent calls have no effect.
    pub fn trigger(&self) {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        });
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the trigger fires or is dropped.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        // Err means the sender is gone, which counts as shutdown.
        let _ = rx.wait_for(|fired| *fired).await;
    }
}
