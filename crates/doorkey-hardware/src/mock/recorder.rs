//! Output recording shared by the mock output devices.
//!
//! A mock output device owns a [`Recorder`]; the paired [`Recording`] is
//! handed to tests or to a front end, which drains what the device was told
//! to do.

use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub(crate) struct Recorder<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Recorder<T> {
    /// Record one output. A dropped [`Recording`] just means nobody watches.
    pub(crate) fn record(&self, event: T) {
        let _ = self.tx.send(event);
    }
}

/// Receiving side of a mock output device.
#[derive(Debug)]
pub struct Recording<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Recording<T> {
    /// Take everything recorded so far without waiting.
    pub fn drain(&mut self) -> Vec<T> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait for the next recorded output. `None` once the device is dropped
    /// and everything has been taken.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

pub(crate) fn channel<T>() -> (Recorder<T>, Recording<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Recorder { tx }, Recording { rx })
}
