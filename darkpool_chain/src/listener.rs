use darkpool_core::chain::{DepositEventSource, MessageIntake};
use darkpool_core::message::Message;
use darkpool_core::queues::QueueHandle;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const PRUNE_THRESHOLD: usize = 10_000;
const PRUNE_KEEP: usize = 5_000;

/// Polls a `DepositEventSource` on a fixed interval and turns each new event
/// into a PENDING `Message`. Each message is stored (via `intake`) before it
/// is pushed onto the message queue, so a status lookup racing the queue pop
/// always finds at least a PENDING entry rather than a transient 404. Tracks
/// seen event ids to guard against the source replaying events already
/// observed, pruning the set once it grows past `PRUNE_THRESHOLD` so it
/// never grows unbounded.
pub struct DepositListener<S: DepositEventSource + ?Sized, I: MessageIntake> {
    source: Arc<S>,
    intake: I,
    messages: QueueHandle<Message>,
    poll_interval: Duration,
    cursor: i64,
    seen: HashSet<String>,
}

impl<S: DepositEventSource + ?Sized, I: MessageIntake> DepositListener<S, I> {
    pub fn new(source: Arc<S>, intake: I, messages: QueueHandle<Message>, poll_interval: Duration, starting_cursor: i64) -> Self {
        Self {
            source,
            intake,
            messages,
            poll_interval,
            cursor: starting_cursor,
            seen: HashSet::new(),
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Runs until `shutdown` resolves. Each iteration's own errors are
    /// logged and swallowed so a single bad poll never kills the task.
    pub async fn run(mut self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        info!(cursor = self.cursor, "DepositListener started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.poll_interval) => {
                    if let Err(e) = self.poll_once(unix_now()).await {
                        error!(error = %e, "deposit poll failed");
                    }
                }
            }
        }
        info!("DepositListener stopped");
    }

    async fn poll_once(&mut self, now: i64) -> anyhow::Result<()> {
        let events = self.source.poll_since(self.cursor).await?;
        for event in events {
            if self.seen.contains(&event.event_id) {
                continue;
            }
            let message = Message::deposit(
                uuid::Uuid::new_v4(),
                event.user.clone(),
                event.asset,
                event.amount,
                event.ledger,
                event.tx_hash.clone(),
                now,
            );
            self.intake.intake(message.clone()).await;
            if self.messages.push(message).is_err() {
                warn!("message queue closed, dropping deposit event {}", event.event_id);
            }
            self.seen.insert(event.event_id);
            if event.ledger + 1 > self.cursor {
                self.cursor = event.ledger + 1;
            }
        }
        self.prune_seen();
        Ok(())
    }

    fn prune_seen(&mut self) {
        if self.seen.len() <= PRUNE_THRESHOLD {
            return;
        }
        let mut sorted: Vec<String> = self.seen.drain().collect();
        sorted.sort();
        self.seen = sorted.into_iter().rev().take(PRUNE_KEEP).collect();
    }
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use darkpool_core::chain::DepositEvent;
    use darkpool_core::order::Asset;
    use darkpool_core::queues::MessageQueue;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    struct StubSource {
        events: Mutex<Vec<DepositEvent>>,
    }

    #[async_trait]
    impl DepositEventSource for StubSource {
        async fn poll_since(&self, _cursor: i64) -> anyhow::Result<Vec<DepositEvent>> {
            Ok(self.events.lock().unwrap().drain(..).collect())
        }
    }

    #[derive(Clone, Default)]
    struct StubIntake {
        received: Arc<Mutex<Vec<Message>>>,
    }

    #[async_trait]
    impl MessageIntake for StubIntake {
        async fn intake(&self, message: Message) {
            self.received.lock().unwrap().push(message);
        }
    }

    #[tokio::test]
    async fn new_event_becomes_pending_deposit_message() {
        let source = Arc::new(StubSource {
            events: Mutex::new(vec![DepositEvent {
                event_id: "1-abc".into(),
                user: "alice".into(),
                asset: Asset::A,
                amount: Decimal::from(10),
                ledger: 100,
                tx_hash: "deadbeef".into(),
            }]),
        });
        let mut queue = MessageQueue::new();
        let handle = queue.handle();
        let intake = StubIntake::default();
        let mut listener = DepositListener::new(source, intake.clone(), handle, Duration::from_secs(1), 0);

        listener.poll_once(0).await.unwrap();

        let msg = queue.recv_timeout(Duration::from_millis(100)).await.unwrap();
        assert_eq!(msg.user, "alice");
        assert_eq!(listener.cursor(), 101);

        let stored = intake.received.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, msg.id);
    }

    #[tokio::test]
    async fn duplicate_event_id_is_ignored() {
        let event = DepositEvent {
            event_id: "1-abc".into(),
            user: "alice".into(),
            asset: Asset::A,
            amount: Decimal::from(10),
            ledger: 100,
            tx_hash: "deadbeef".into(),
        };
        let source = Arc::new(StubSource {
            events: Mutex::new(vec![event.clone()]),
        });
        let mut queue = MessageQueue::new();
        let handle = queue.handle();
        let intake = StubIntake::default();
        let mut listener = DepositListener::new(source.clone(), intake.clone(), handle.clone(), Duration::from_secs(1), 0);
        listener.poll_once(0).await.unwrap();
        let _ = queue.recv_timeout(Duration::from_millis(100)).await;

        source.events.lock().unwrap().push(event);
        listener.poll_once(0).await.unwrap();
        let second = queue.recv_timeout(Duration::from_millis(50)).await;
        assert!(second.is_none());
        assert_eq!(intake.received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pruning_keeps_newest_half_past_threshold() {
        let source = Arc::new(StubSource { events: Mutex::new(Vec::new()) });
        let mut queue = MessageQueue::new();
        let handle = queue.handle();
        let mut listener = DepositListener::new(source, StubIntake::default(), handle, Duration::from_secs(1), 0);
        for i in 0..10_001 {
            listener.seen.insert(format!("{i:06}"));
        }
        listener.prune_seen();
        assert_eq!(listener.seen.len(), PRUNE_KEEP);
        assert!(listener.seen.contains(&format!("{:06}", 10_000)));
        assert!(!listener.seen.contains(&format!("{:06}", 0)));
    }
}
