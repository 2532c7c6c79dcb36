use std::time::Duration;
use tokio::sync::mpsc;

/// Single-producer-friendly, multi-producer-capable FIFO queue with a
/// bounded-wait pop: `recv_timeout` returns `None` on expiry instead of
/// blocking forever, so the engine loop that owns the receiving end can wake
/// up periodically to check a shutdown signal even when idle.
pub struct Queue<T> {
    tx: mpsc::UnboundedSender<T>,
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> QueueHandle<T> {
        QueueHandle { tx: self.tx.clone() }
    }

    pub async fn recv_timeout(&mut self, timeout: Duration) -> Option<T> {
        tokio::time::timeout(timeout, self.rx.recv()).await.ok().flatten()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable send-only handle, given out to producers (HTTP routes,
/// `DepositListener`, `MessageHandler` enqueuing Actions) that never need to
/// pop from the same queue they push into.
pub struct QueueHandle<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for QueueHandle<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T> QueueHandle<T> {
    pub fn push(&self, item: T) -> Result<(), T> {
        self.tx.send(item).map_err(|e| e.0)
    }
}

pub type MessageQueue = Queue<crate::message::Message>;
pub type ActionQueue = Queue<crate::action::Action>;
