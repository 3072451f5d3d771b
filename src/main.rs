use std::sync::Arc;

use anyhow::Context;
use rentloop::{
    ApiClient, ClientConfig, ClientMetrics, FileTokenStore, HeroLoader, HeroResource, Session,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cfg = ClientConfig::from_env()?;
    rentloop::telemetry::init_tracing(cfg.mode);

    let session = match &cfg.storage_path {
        Some(path) => {
            let store = FileTokenStore::open(path)
                .with_context(|| format!("failed to open token store at {}", path.display()))?;
            Session::restore(Arc::new(store))
        }
        None => Session::in_memory(),
    };

    let metrics = ClientMetrics::new()?;
    let client = ApiClient::try_new(&cfg, session)?.with_metrics(metrics.clone());
    let loader = HeroLoader::new(client, &cfg);

    tracing::info!(base_url = %cfg.base_url, mode = ?cfg.mode, "probing rentloop api");

    let summary = loader.load_all().await;
    let snapshot = loader.snapshot();

    for resource in HeroResource::ALL {
        match snapshot.error(resource) {
            Some(error) => tracing::error!(resource = resource.key(), %error, "load failed"),
            None => tracing::info!(
                resource = resource.key(),
                fetched_at = ?snapshot.fetched_at(resource),
                "load ok"
            ),
        }
    }

    tracing::info!(
        featured_products = snapshot.featured_products.len(),
        featured_listings = snapshot.featured_listings.len(),
        categories = snapshot.categories.len(),
        banners = snapshot.banners.len(),
        "landing page snapshot"
    );
    tracing::debug!(metrics = %metrics.export()?, "client metrics");

    loader.shutdown();

    if summary.is_complete() {
        Ok(())
    } else {
        anyhow::bail!("{} of {} resources failed to load", summary.failed.len(), HeroResource::ALL.len())
    }
}
