//! In-process index of the dashboards the watcher has accepted.
//!
//! The registry is owned by the system and handed to the handler explicitly;
//! there is no process-wide instance.

use crate::model::DashboardSpec;
use finalizer_watcher::ResourceIdentifier;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredDashboard {
    pub spec: DashboardSpec,
    pub generation: i64,
}

#[derive(Debug, Default)]
pub struct DashboardRegistry {
    dashboards: RwLock<HashMap<ResourceIdentifier, RegisteredDashboard>>,
}

impl DashboardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `spec` unless a newer generation is already registered.
    /// Returns whether the entry changed.
    pub fn save(&self, id: ResourceIdentifier, spec: DashboardSpec, generation: i64) -> bool {
        let mut dashboards = self.dashboards.write().unwrap_or_else(|e| e.into_inner());
        match dashboards.get(&id) {
            Some(existing) if existing.generation > generation => false,
            Some(existing) if existing.generation == generation && existing.spec == spec => false,
            _ => {
                dashboards.insert(id, RegisteredDashboard { spec, generation });
                true
            }
        }
    }

    pub fn remove(&self, id: &ResourceIdentifier) -> Option<RegisteredDashboard> {
        self.dashboards
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
    }

    pub fn get(&self, id: &ResourceIdentifier) -> Option<RegisteredDashboard> {
        self.dashboards
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.dashboards.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(title: &str) -> DashboardSpec {
        DashboardSpec {
            title: title.into(),
            panels: Vec::new(),
        }
    }

    #[test]
    fn save_is_idempotent_and_ignores_stale_generations() {
        let registry = DashboardRegistry::new();
        let id = ResourceIdentifier::new("default", "home");

        assert!(registry.save(id.clone(), spec("Home"), 1));
        assert!(!registry.save(id.clone(), spec("Home"), 1));
        assert!(registry.save(id.clone(), spec("Home v2"), 2));
        assert!(!registry.save(id.clone(), spec("Home"), 1));

        assert_eq!(registry.get(&id).unwrap().spec.title, "Home v2");
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(&id).is_some());
        assert!(registry.is_empty());
        assert!(registry.remove(&id).is_none());
    }
}
