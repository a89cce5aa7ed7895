use crate::ports::{EventSource, TimeProvider};
use crate::types::events::{Category, DisasterEvent};

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const FEED_CAPACITY: usize = 16;

/// Owned subscription to the batches published under one live event name.
///
/// Dropping the channel releases it and stops the producing task, if any.
pub struct LiveChannel {
    event_name: String,
    batches: mpsc::Receiver<Vec<DisasterEvent>>,
    feed: Option<JoinHandle<()>>,
}

impl LiveChannel {
    pub fn new(event_name: impl Into<String>, batches: mpsc::Receiver<Vec<DisasterEvent>>) -> Self {
        Self {
            event_name: event_name.into(),
            batches,
            feed: None,
        }
    }

    fn with_feed(
        event_name: String,
        batches: mpsc::Receiver<Vec<DisasterEvent>>,
        feed: JoinHandle<()>,
    ) -> Self {
        Self {
            event_name,
            batches,
            feed: Some(feed),
        }
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Next batch in arrival order, `None` once the producer is gone.
    pub async fn next_batch(&mut self) -> Option<Vec<DisasterEvent>> {
        self.batches.recv().await
    }

    /// Releases the channel and waits for the producer to stop.
    pub async fn close(mut self) {
        self.batches.close();
        if let Some(feed) = self.feed.take() {
            feed.abort();
            let _ = feed.await;
        }
        debug!(event = %self.event_name, "live channel closed");
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.abort();
            debug!(event = %self.event_name, "live channel released");
        }
    }
}

/// Publishes the category's current events as a batch every `interval`.
pub fn spawn_polling_feed<S, T>(
    category: Category,
    source: S,
    time: T,
    interval: Duration,
) -> LiveChannel
where
    S: EventSource,
    T: TimeProvider,
{
    let (sender, receiver) = mpsc::channel(FEED_CAPACITY);
    let event_name = category.live_event_name();
    let feed = tokio::spawn(poll_events(category, source, time, interval, sender));
    LiveChannel::with_feed(event_name, receiver, feed)
}

async fn poll_events<S, T>(
    category: Category,
    source: S,
    time: T,
    interval: Duration,
    sender: mpsc::Sender<Vec<DisasterEvent>>,
) where
    S: EventSource,
    T: TimeProvider,
{
    loop {
        time.sleep(interval).await;
        match source.fetch_events(&category).await {
            Ok(events) if events.is_empty() => {}
            Ok(events) => {
                if sender.send(events).await.is_err() {
                    debug!(%category, "live channel receiver dropped; stopping feed");
                    return;
                }
            }
            Err(err) => warn!(%category, error = %err, "live poll failed"),
        }
    }
}
