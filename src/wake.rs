//! Level-triggered redraw signal.
//!
//! Producers bump a generation counter; the renderer only asks "has anything
//! changed since I last looked". Any number of signals between two looks
//! collapse into one redraw.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct Wake {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for Wake {
    fn default() -> Self {
        Self::new()
    }
}

impl Wake {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0u64);
        Self { tx: Arc::new(tx) }
    }

    pub fn signal(&self) {
        self.tx.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    pub fn subscribe(&self) -> WakeReceiver {
        WakeReceiver {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of signals sent so far.
    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }
}

pub struct WakeReceiver {
    rx: watch::Receiver<u64>,
}

impl WakeReceiver {
    /// Consume a pending wake without blocking.
    pub fn take(&mut self) -> bool {
        match self.rx.has_changed() {
            Ok(true) => {
                self.rx.borrow_and_update();
                true
            }
            _ => false,
        }
    }

    /// Wait for the next wake. Returns false once every producer is gone.
    pub async fn wait(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
