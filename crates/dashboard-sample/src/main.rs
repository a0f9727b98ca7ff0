//! # Dashboard Sample
//!
//! Runs one dashboard through its whole lifecycle:
//!
//! 1. Create: the handler registers it, the watcher adds its finalizer.
//! 2. Relist: the replay is recognised by the finalizer and not re-added.
//! 3. Update: a spec change reaches the handler.
//! 4. Delete: the handler unregisters it, then the finalizer is released and
//!    the store lets it go.
//!
//! Configuration comes from an optional TOML file given as the first argument,
//! overridden by `WATCHER__*` environment variables:
//!
//! ```bash
//! cd crates/dashboard-sample
//! RUST_LOG=info cargo run -- watcher.toml
//! WATCHER__SYNC_POLICY=replay_as_add RUST_LOG=debug cargo run
//! ```

use dashboard_sample::lifecycle::DashboardSystem;
use dashboard_sample::model::Dashboard;
use finalizer_watcher::runtime::setup_tracing;
use finalizer_watcher::WatcherConfig;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let path = std::env::args().nth(1);
    let config = WatcherConfig::load(path.as_deref()).map_err(|e| e.to_string())?;
    info!(?config, "Starting dashboard sample");

    let system = DashboardSystem::new(config);

    let home = Dashboard::new("default", "home", "Home").with_panel("Requests", "timeseries");
    let id = async { system.create(home).await.map_err(|e| e.to_string()) }
        .instrument(tracing::info_span!("create"))
        .await?;
    info!(dashboard = %id, registered = system.registry.len(), "Dashboard created");

    async { system.relist(&id).await.map_err(|e| e.to_string()) }
        .instrument(tracing::info_span!("relist"))
        .await?;

    let mut spec = system
        .registry
        .get(&id)
        .map(|entry| entry.spec)
        .ok_or_else(|| format!("{id} missing from registry"))?;
    spec.title = "Home (edited)".to_string();
    async { system.update_spec(&id, spec).await.map_err(|e| e.to_string()) }
        .instrument(tracing::info_span!("update"))
        .await?;

    async { system.delete(&id).await.map_err(|e| e.to_string()) }
        .instrument(tracing::info_span!("delete"))
        .await?;
    info!(
        dashboard = %id,
        stored = system.store.contains(&id),
        registered = system.registry.len(),
        "Dashboard deleted"
    );

    system.shutdown().await.map_err(|e| e.to_string())?;
    info!("Sample completed successfully");
    Ok(())
}
