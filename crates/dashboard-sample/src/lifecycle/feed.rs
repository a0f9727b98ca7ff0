//! # Scripted Event Feed
//!
//! Stands in for an informer: notifications are queued on a channel and handed
//! to an [`EventHandler`] one at a time, so events for the same dashboard are
//! never processed concurrently. A failed notification is redelivered a bounded
//! number of times before its error is reported back to the sender.

use crate::model::Dashboard;
use finalizer_watcher::{EventContext, EventHandler, WatcherError};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::SampleError;

/// One notification, as an event source would deliver it.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Added(Dashboard),
    Modified { old: Dashboard, new: Dashboard },
    Deleted(Dashboard),
}

impl WatchEvent {
    fn label(&self) -> &'static str {
        match self {
            WatchEvent::Added(_) => "added",
            WatchEvent::Modified { .. } => "modified",
            WatchEvent::Deleted(_) => "deleted",
        }
    }
}

struct Delivery {
    event: WatchEvent,
    respond_to: oneshot::Sender<Result<(), WatcherError>>,
}

/// Sending half of the feed. Dropping every clone stops the feed loop.
#[derive(Clone)]
pub struct FeedClient {
    sender: mpsc::Sender<Delivery>,
}

impl FeedClient {
    /// Queues `event` and waits until the handler has accepted it or the
    /// redelivery budget ran out.
    pub async fn deliver(&self, event: WatchEvent) -> Result<(), SampleError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(Delivery { event, respond_to })
            .await
            .map_err(|_| SampleError::FeedClosed)?;
        response.await.map_err(|_| SampleError::FeedClosed)??;
        Ok(())
    }
}

/// Receiving half; run it with [`EventFeed::run`].
pub struct EventFeed {
    receiver: mpsc::Receiver<Delivery>,
    max_redeliveries: u32,
}

impl EventFeed {
    pub fn new(buffer_size: usize, max_redeliveries: u32) -> (Self, FeedClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (
            Self {
                receiver,
                max_redeliveries,
            },
            FeedClient { sender },
        )
    }

    /// Dispatches notifications until every client is dropped or `cancel` fires.
    pub async fn run(mut self, handler: Arc<dyn EventHandler<Dashboard>>, cancel: CancellationToken) {
        info!("Event feed started");
        loop {
            let delivery = tokio::select! {
                _ = cancel.cancelled() => break,
                delivery = self.receiver.recv() => match delivery {
                    Some(delivery) => delivery,
                    None => break,
                },
            };

            let ctx = EventContext::with_cancellation(cancel.child_token());
            let mut attempt = 0;
            let result = loop {
                attempt += 1;
                debug!(event = delivery.event.label(), attempt, "Delivering");
                match dispatch(handler.as_ref(), &ctx, &delivery.event).await {
                    Ok(()) => break Ok(()),
                    Err(e) if attempt <= self.max_redeliveries && !ctx.is_cancelled() => {
                        warn!(event = delivery.event.label(), attempt, error = %e, "Delivery failed, redelivering");
                    }
                    Err(e) => break Err(e),
                }
            };
            let _ = delivery.respond_to.send(result);
        }
        info!("Event feed stopped");
    }
}

async fn dispatch(
    handler: &dyn EventHandler<Dashboard>,
    ctx: &EventContext,
    event: &WatchEvent,
) -> Result<(), WatcherError> {
    match event {
        WatchEvent::Added(dashboard) => handler.on_add(ctx, dashboard).await,
        WatchEvent::Modified { old, new } => handler.on_update(ctx, old, new).await,
        WatchEvent::Deleted(dashboard) => handler.on_delete(ctx, dashboard).await,
    }
}
