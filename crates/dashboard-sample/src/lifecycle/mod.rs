//! # System Lifecycle
//!
//! [`DashboardSystem`] wires the pieces of the sample together:
//!
//! 1. An in-memory [`MockStore`] playing the remote store
//! 2. A [`DashboardRegistry`] and the [`DashboardHandler`] that fills it
//! 3. A [`Watcher`] for the dashboard kind, wrapping the handler
//! 4. An [`EventFeed`] task delivering notifications to the watcher
//!
//! The system also plays the part of the API server: [`DashboardSystem::create`],
//! [`DashboardSystem::update_spec`] and [`DashboardSystem::delete`] change the
//! store and then emit the notification a real event source would have
//! produced, including the echo of the watcher's own finalizer writes.
//!
//! Shutdown cancels in-flight events, closes the feed and waits for its task.

pub mod feed;

pub use feed::{EventFeed, FeedClient, WatchEvent};

use crate::handler::DashboardHandler;
use crate::model::{Dashboard, DashboardSpec};
use crate::registry::DashboardRegistry;
use finalizer_watcher::mock::MockStore;
use finalizer_watcher::{ResourceIdentifier, Watcher, WatcherConfig, WatcherError};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Watcher(#[from] WatcherError),

    #[error("Dashboard not found: {0}")]
    NotFound(ResourceIdentifier),

    #[error("Event feed is closed")]
    FeedClosed,

    #[error("Event feed task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Redeliveries the feed attempts before reporting an error.
const MAX_REDELIVERIES: u32 = 2;

pub struct DashboardSystem {
    pub store: MockStore<Dashboard>,
    pub registry: Arc<DashboardRegistry>,
    pub watcher: Arc<Watcher<Dashboard>>,
    feed: FeedClient,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl DashboardSystem {
    /// Builds the system and starts the feed task.
    pub fn new(config: WatcherConfig) -> Self {
        let store = MockStore::new();
        let registry = Arc::new(DashboardRegistry::new());

        let watcher = Arc::new(
            Watcher::builder(Dashboard::kind(), Arc::new(store.clone()))
                .config(config)
                .simple_handler(DashboardHandler::new(registry.clone()))
                .build(),
        );

        let cancel = CancellationToken::new();
        let (feed, client) = EventFeed::new(32, MAX_REDELIVERIES);
        let handle = tokio::spawn(feed.run(watcher.clone(), cancel.clone()));

        info!(finalizer = %watcher.finalizer(), "Dashboard system started");
        Self {
            store,
            registry,
            watcher,
            feed: client,
            cancel,
            handle,
        }
    }

    /// Stores a new dashboard and delivers its Add notification.
    pub async fn create(&self, dashboard: Dashboard) -> Result<ResourceIdentifier, SampleError> {
        let id = self.store.insert(dashboard);
        let created = self.current(&id)?;
        self.feed.deliver(WatchEvent::Added(created.clone())).await?;
        self.deliver_echo(&id, created).await?;
        Ok(id)
    }

    /// Replaces a dashboard's spec, bumping its generation like a store does.
    pub async fn update_spec(&self, id: &ResourceIdentifier, spec: DashboardSpec) -> Result<(), SampleError> {
        let old = self.current(id)?;
        let mut new = old.clone();
        new.spec = spec;
        new.metadata.generation += 1;
        self.store.insert(new.clone());
        self.feed
            .deliver(WatchEvent::Modified { old, new })
            .await
    }

    /// Requests deletion and delivers whatever notifications follow from it.
    pub async fn delete(&self, id: &ResourceIdentifier) -> Result<(), SampleError> {
        let old = self.current(id)?;
        match self.store.request_delete(id) {
            Some(deleting) => {
                self.feed
                    .deliver(WatchEvent::Modified {
                        old,
                        new: deleting.clone(),
                    })
                    .await?;
                if !self.store.contains(id) {
                    self.feed.deliver(WatchEvent::Deleted(deleting)).await?;
                }
                Ok(())
            }
            None => self.feed.deliver(WatchEvent::Deleted(old)).await,
        }
    }

    /// Replays the Add notification for a stored dashboard, as a relist after
    /// a restart would.
    pub async fn relist(&self, id: &ResourceIdentifier) -> Result<(), SampleError> {
        let current = self.current(id)?;
        self.feed.deliver(WatchEvent::Added(current)).await
    }

    /// Cancels in-flight work, closes the feed, and waits for it to stop.
    pub async fn shutdown(self) -> Result<(), SampleError> {
        self.cancel.cancel();
        drop(self.feed);
        self.handle.await?;
        info!("Dashboard system stopped");
        Ok(())
    }

    fn current(&self, id: &ResourceIdentifier) -> Result<Dashboard, SampleError> {
        self.store
            .snapshot(id)
            .ok_or_else(|| SampleError::NotFound(id.clone()))
    }

    /// Emits the Modified notification for writes the watcher made itself.
    async fn deliver_echo(&self, id: &ResourceIdentifier, before: Dashboard) -> Result<(), SampleError> {
        let Some(after) = self.store.snapshot(id) else {
            return Ok(());
        };
        if after == before {
            return Ok(());
        }
        debug!(dashboard = %id, "Echoing watcher write");
        self.feed
            .deliver(WatchEvent::Modified { old: before, new: after })
            .await
    }
}
