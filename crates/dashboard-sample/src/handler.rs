//! Business logic for dashboards, written against the plain three-method
//! handler shape.

use crate::model::Dashboard;
use crate::registry::DashboardRegistry;
use async_trait::async_trait;
use finalizer_watcher::{EventContext, HandlerError, SimpleHandler};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Dashboard {0} has an empty title")]
    EmptyTitle(String),
}

/// Keeps the [`DashboardRegistry`] in line with the stored dashboards.
///
/// `add` may run again for a dashboard whose finalizer write failed; the
/// registry's generation check makes that harmless.
#[derive(Clone)]
pub struct DashboardHandler {
    registry: Arc<DashboardRegistry>,
}

impl DashboardHandler {
    pub fn new(registry: Arc<DashboardRegistry>) -> Self {
        Self { registry }
    }

    fn save(&self, dashboard: &Dashboard) -> Result<(), HandlerError> {
        let meta = &dashboard.metadata;
        if dashboard.spec.title.trim().is_empty() {
            return Err(DashboardError::EmptyTitle(meta.identifier().to_string()).into());
        }
        let changed = self
            .registry
            .save(meta.identifier(), dashboard.spec.clone(), meta.generation);
        info!(
            dashboard = %meta.identifier(),
            generation = meta.generation,
            changed,
            "Dashboard saved"
        );
        Ok(())
    }
}

#[async_trait]
impl SimpleHandler<Dashboard> for DashboardHandler {
    async fn add(&self, _ctx: &EventContext, dashboard: &Dashboard) -> Result<(), HandlerError> {
        self.save(dashboard)
    }

    async fn update(
        &self,
        _ctx: &EventContext,
        _old: &Dashboard,
        new: &Dashboard,
    ) -> Result<(), HandlerError> {
        self.save(new)
    }

    async fn delete(&self, _ctx: &EventContext, dashboard: &Dashboard) -> Result<(), HandlerError> {
        let id = dashboard.metadata.identifier();
        let removed = self.registry.remove(&id).is_some();
        info!(dashboard = %id, removed, "Dashboard removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let registry = Arc::new(DashboardRegistry::new());
        let handler = DashboardHandler::new(registry.clone());
        let ctx = EventContext::new();

        let err = handler
            .add(&ctx, &Dashboard::new("default", "blank", "  "))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Dashboard default/blank has an empty title");
        assert!(registry.is_empty());

        handler
            .add(&ctx, &Dashboard::new("default", "home", "Home"))
            .await
            .unwrap();
        assert_eq!(registry.len(), 1);
    }
}
