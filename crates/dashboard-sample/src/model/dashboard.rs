use finalizer_watcher::{Resource, ResourceKind, ResourceMetadata};
use serde::{Deserialize, Serialize};

/// API group dashboards are served under.
pub const DASHBOARD_GROUP: &str = "dashboard.grafana.app";

/// A stored dashboard: metadata managed by the store, spec owned by users.
///
/// # Watcher
/// This struct implements [`Resource`] with an explicit
/// [`metadata`](Resource::metadata) accessor, so the watcher never needs to
/// serialize it just to read its name or finalizers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub metadata: ResourceMetadata,
    pub spec: DashboardSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSpec {
    pub title: String,
    #[serde(default)]
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub title: String,
    #[serde(rename = "type")]
    pub panel_type: String,
}

impl Dashboard {
    /// Creates a dashboard at generation 1 in `namespace`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            metadata: ResourceMetadata::new(name, 1).with_namespace(namespace),
            spec: DashboardSpec {
                title: title.into(),
                panels: Vec::new(),
            },
        }
    }

    pub fn with_panel(mut self, title: impl Into<String>, panel_type: impl Into<String>) -> Self {
        self.spec.panels.push(Panel {
            title: title.into(),
            panel_type: panel_type.into(),
        });
        self
    }

    pub fn kind() -> ResourceKind {
        ResourceKind::new(DASHBOARD_GROUP, "v1", "Dashboard")
    }
}

impl Resource for Dashboard {
    fn metadata(&self) -> Option<ResourceMetadata> {
        Some(self.metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finalizer_watcher::extract_metadata;

    #[test]
    fn metadata_comes_from_the_accessor() {
        let d = Dashboard::new("default", "home", "Home").with_panel("CPU", "timeseries");
        let meta = extract_metadata(&d).unwrap();
        assert_eq!(meta.name, "home");
        assert_eq!(meta.namespace, "default");
        assert_eq!(meta.generation, 1);
        assert_eq!(d.spec.panels.len(), 1);
    }

    #[test]
    fn kind_derives_finalizer_token() {
        assert_eq!(
            Dashboard::kind().finalizer_token(),
            "dashboard.grafana.app.dashboard"
        );
    }
}
