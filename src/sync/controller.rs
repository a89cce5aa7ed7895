use crate::error::InitialLoadError;
use crate::ports::{EventSource, TimeProvider};
use crate::store::EventStore;
use crate::sync::channel::LiveChannel;
use crate::types::events::{Category, DisasterEvent};
use crate::types::push::SubscriberStatus;

use serde::Serialize;
use std::sync::Arc;
use std::sync::Mutex;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncStatus {
    pub loaded: bool,
    pub last_error: Option<String>,
    pub batches_merged: u64,
    pub last_synced_at: Option<OffsetDateTime>,
}

/// Read-only view of one category for the presentation layer.
#[derive(Clone)]
pub struct CategoryHandle {
    store: Arc<Mutex<EventStore>>,
    status: watch::Receiver<SyncStatus>,
    notifications: watch::Receiver<SubscriberStatus>,
}

impl CategoryHandle {
    pub fn read<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&EventStore) -> O,
    {
        let store = self.store.lock().expect("event store lock");
        f(&store)
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Notification state mirrored from the subscriber, for display.
    pub fn notification_status(&self) -> SubscriberStatus {
        self.notifications.borrow().clone()
    }
}

/// Loads a category once, then merges every batch of its live channel.
pub struct SyncController<S, T> {
    category: Category,
    source: S,
    time: T,
    channel: LiveChannel,
    store: Arc<Mutex<EventStore>>,
    status: watch::Sender<SyncStatus>,
    notifications: watch::Receiver<SubscriberStatus>,
}

impl<S, T> SyncController<S, T>
where
    S: EventSource,
    T: TimeProvider,
{
    pub fn new(
        category: Category,
        source: S,
        time: T,
        channel: LiveChannel,
        notifications: watch::Receiver<SubscriberStatus>,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        Self {
            category,
            source,
            time,
            channel,
            store: Arc::new(Mutex::new(EventStore::new())),
            status,
            notifications,
        }
    }

    pub fn handle(&self) -> CategoryHandle {
        CategoryHandle {
            store: Arc::clone(&self.store),
            status: self.status.subscribe(),
            notifications: self.notifications.clone(),
        }
    }

    /// Seeds the store from one bulk fetch. On failure the store keeps its
    /// contents and stays open to merges.
    pub async fn start(&mut self) -> Result<usize, InitialLoadError> {
        match self.source.fetch_events(&self.category).await {
            Ok(events) => {
                let count = {
                    let mut store = self.store.lock().expect("event store lock");
                    store.load(events);
                    store.len()
                };
                let now = self.time.now();
                self.status.send_modify(|status| {
                    status.loaded = true;
                    status.last_error = None;
                    status.last_synced_at = Some(now);
                });
                info!(category = %self.category, count, "loaded initial events");
                Ok(count)
            }
            Err(err) => {
                let err = InitialLoadError {
                    category: self.category.clone(),
                    reason: err.to_string(),
                };
                warn!(category = %self.category, error = %err, "initial load failed");
                let message = err.to_string();
                self.status
                    .send_modify(|status| status.last_error = Some(message));
                Err(err)
            }
        }
    }

    pub fn apply_batch(&self, batch: Vec<DisasterEvent>) {
        let incoming = batch.len();
        let total = {
            let mut store = self.store.lock().expect("event store lock");
            store.merge(batch);
            store.len()
        };
        let now = self.time.now();
        self.status.send_modify(|status| {
            status.batches_merged += 1;
            status.last_synced_at = Some(now);
        });
        debug!(category = %self.category, incoming, total, "merged live batch");
    }

    /// Loads, then drains the live channel until it closes. The channel is
    /// released when this returns or the task running it is aborted.
    pub async fn run(mut self) {
        if let Err(err) = self.start().await {
            debug!(category = %self.category, error = %err, "continuing without initial events");
        }
        info!(
            category = %self.category,
            event = %self.channel.event_name(),
            "listening for live batches"
        );
        while let Some(batch) = self.channel.next_batch().await {
            self.apply_batch(batch);
        }
        info!(category = %self.category, "live channel ended");
    }
}
