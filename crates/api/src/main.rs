use anyhow::Context;
use serde::Serialize;

use nexus_api::{CallContext, InventoryService, Snapshot};
use nexus_auth::{Principal, Role};
use nexus_catalog::{CatalogSeed, CatalogStore};
use nexus_infra::NexusConfig;
use nexus_infra::projections::DashboardSummary;

#[derive(Serialize)]
struct AdminReport {
    snapshot: Snapshot,
    dashboard: DashboardSummary,
}

fn load_catalog(config: &NexusConfig) -> anyhow::Result<CatalogStore> {
    let seed = match &config.seed_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog seed {}", path.display()))?;
            serde_json::from_str::<CatalogSeed>(&raw)
                .with_context(|| format!("failed to parse catalog seed {}", path.display()))?
        }
        None => {
            tracing::warn!("no catalog seed configured; using the built-in demo catalog");
            CatalogSeed::demo()
        }
    };
    Ok(seed.into_store()?)
}

fn main() -> anyhow::Result<()> {
    let config = NexusConfig::from_env()?;
    nexus_observability::init(&config.log);

    let catalog = load_catalog(&config)?;
    tracing::info!(
        warehouses = catalog.warehouses().len(),
        categories = catalog.categories().len(),
        "catalog loaded"
    );

    let service = InventoryService::new(config, catalog);
    let ctx = CallContext::new(Principal::new("nexus-admin", Role::Admin));

    let report = AdminReport {
        snapshot: service.snapshot(&ctx)?,
        dashboard: service.dashboard(&ctx)?,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
