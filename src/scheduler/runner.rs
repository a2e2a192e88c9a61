//! Daily APOD broadcast runner.
//!
//! The runner sleeps until the next configured UTC time, then visits a
//! snapshot of the subscriber registry. A subscriber added while a run is in
//! progress is picked up by the next run. Per-recipient failures are logged
//! and counted; they never stop the run.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::{BroadcastReport, DailyTime};
use crate::commands::CommandHandler;

/// Messages that can be sent to the scheduler.
#[derive(Debug, Clone)]
pub enum SchedulerMessage {
    /// Run a broadcast now, outside the daily schedule.
    TriggerBroadcast,
    /// Stop the scheduler.
    Shutdown,
}

/// Sends the APOD to every subscriber once a day.
pub struct DailyBroadcaster {
    handler: Arc<CommandHandler>,
    time: DailyTime,
}

impl DailyBroadcaster {
    #[must_use]
    pub const fn new(handler: Arc<CommandHandler>, time: DailyTime) -> Self {
        Self { handler, time }
    }

    /// Runs the scheduler loop until `Shutdown` arrives or the channel closes.
    pub async fn run(&self, mut rx: mpsc::Receiver<SchedulerMessage>) {
        info!("Daily broadcast scheduler started ({})", self.time);

        loop {
            let now = Utc::now();
            let next = self.time.next_after(now);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!("Next broadcast at {} (in {:?})", next, wait);

            tokio::select! {
                () = tokio::time::sleep(wait) => {
                    self.broadcast().await;
                }
                msg = rx.recv() => {
                    match msg {
                        Some(SchedulerMessage::TriggerBroadcast) => {
                            debug!("Received trigger broadcast message");
                            self.broadcast().await;
                        }
                        Some(SchedulerMessage::Shutdown) | None => {
                            info!("Scheduler shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Delivers today's APOD to a snapshot of the subscribers.
    pub async fn broadcast(&self) -> BroadcastReport {
        let recipients = self.handler.subscribers().snapshot().await;
        info!("Starting daily APOD broadcast to {} subscribers", recipients.len());

        let mut report = BroadcastReport::default();
        for chat_id in recipients {
            match self.handler.deliver_daily_apod(chat_id).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!("Daily APOD to chat {} failed: {}", chat_id, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Daily broadcast finished: {} delivered, {} failed",
            report.delivered, report.failed
        );
        report
    }
}

impl std::fmt::Debug for DailyBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyBroadcaster")
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Timelike;

    use super::*;
    use crate::api::{Endpoint, SpaceFeeds};
    use crate::subscribers::SubscriberRegistry;
    use crate::telegram::{ChatId, Messenger, Outgoing, TransportError};
    use crate::testing::{FakeFeeds, RecordingMessenger};

    const A: ChatId = ChatId(1);
    const B: ChatId = ChatId(2);

    fn broadcaster(messenger: &Arc<RecordingMessenger>, feeds: &Arc<FakeFeeds>) -> DailyBroadcaster {
        let handler = CommandHandler::new(
            Arc::clone(messenger) as Arc<dyn Messenger>,
            Arc::clone(feeds) as Arc<dyn SpaceFeeds>,
            Arc::new(SubscriberRegistry::new()),
        );
        // Twelve hours away, so only explicit triggers fire during the test.
        let hour = (Utc::now().hour() + 12) % 24;
        DailyBroadcaster::new(Arc::new(handler), DailyTime::new(hour, 0).unwrap())
    }

    #[tokio::test]
    async fn test_failed_recipient_does_not_stop_run() {
        let messenger = Arc::new(RecordingMessenger::failing_for([A]));
        let feeds = Arc::new(FakeFeeds::healthy());
        let broadcaster = broadcaster(&messenger, &feeds);
        broadcaster.handler.subscribers().subscribe(A).await;
        broadcaster.handler.subscribers().subscribe(B).await;

        let report = broadcaster.broadcast().await;

        assert_eq!(report, BroadcastReport { delivered: 1, failed: 1 });
        let to_b = messenger.sent_to(B);
        assert_eq!(to_b.len(), 1);
        assert!(to_b[0].is_photo());
        assert!(messenger.sent_to(A).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_per_recipient() {
        let messenger = Arc::new(RecordingMessenger::new());
        let feeds = Arc::new(FakeFeeds::healthy().failing(Endpoint::Apod));
        let broadcaster = broadcaster(&messenger, &feeds);
        broadcaster.handler.subscribers().subscribe(A).await;
        broadcaster.handler.subscribers().subscribe(B).await;

        let report = broadcaster.broadcast().await;

        assert_eq!(report.failed, 2);
        assert_eq!(feeds.calls(), vec![Endpoint::Apod, Endpoint::Apod]);
        for chat in [A, B] {
            let sent = messenger.sent_to(chat);
            assert_eq!(sent.len(), 1);
            assert!(sent[0].body().starts_with("Sorry"));
        }
    }

    /// Subscribes `late` whenever anything is delivered.
    struct SubscribingMessenger {
        inner: RecordingMessenger,
        registry: Arc<SubscriberRegistry>,
        late: ChatId,
    }

    #[async_trait]
    impl Messenger for SubscribingMessenger {
        async fn deliver(&self, chat_id: ChatId, message: &Outgoing) -> Result<(), TransportError> {
            self.registry.subscribe(self.late).await;
            self.inner.deliver(chat_id, message).await
        }

        async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
            self.inner.acknowledge(callback_id).await
        }
    }

    #[tokio::test]
    async fn test_subscriber_added_mid_run_waits_for_next_run() {
        let late = ChatId(3);
        let registry = Arc::new(SubscriberRegistry::new());
        registry.subscribe(A).await;
        registry.subscribe(B).await;

        let messenger = Arc::new(SubscribingMessenger {
            inner: RecordingMessenger::new(),
            registry: Arc::clone(&registry),
            late,
        });
        let handler = CommandHandler::new(
            Arc::clone(&messenger) as Arc<dyn Messenger>,
            Arc::new(FakeFeeds::healthy()),
            Arc::clone(&registry),
        );
        let broadcaster = DailyBroadcaster::new(Arc::new(handler), DailyTime::default());

        let first = broadcaster.broadcast().await;

        assert_eq!(first, BroadcastReport { delivered: 2, failed: 0 });
        assert!(registry.contains(late).await);
        assert!(messenger.inner.sent_to(late).is_empty());

        let second = broadcaster.broadcast().await;

        assert_eq!(second.delivered, 3);
        assert_eq!(messenger.inner.sent_to(late).len(), 1);
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let messenger = Arc::new(RecordingMessenger::new());
        let feeds = Arc::new(FakeFeeds::healthy());
        let report = broadcaster(&messenger, &feeds).broadcast().await;
        assert_eq!(report.total(), 0);
        assert!(feeds.calls().is_empty());
    }

    #[tokio::test]
    async fn test_trigger_then_shutdown() {
        let messenger = Arc::new(RecordingMessenger::new());
        let feeds = Arc::new(FakeFeeds::healthy());
        let broadcaster = broadcaster(&messenger, &feeds);
        broadcaster.handler.subscribers().subscribe(B).await;

        let (tx, rx) = mpsc::channel(4);
        tx.send(SchedulerMessage::TriggerBroadcast).await.unwrap();
        tx.send(SchedulerMessage::Shutdown).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), broadcaster.run(rx))
            .await
            .unwrap();

        assert_eq!(messenger.sent_to(B).len(), 1);
    }
}
