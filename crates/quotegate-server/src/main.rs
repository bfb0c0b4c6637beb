//! Quotegate server binary.

use std::sync::Arc;

use anyhow::Context;
use quotegate_server::{AppState, Gateway, Settings, metrics::init_metrics, run_server};
use quotegate_upstream::{CoinMarketCapClient, MarketDataSource};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().context("invalid configuration")?;

    tracing::info!("Starting Quotegate v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Upstream: {}", settings.upstream.base_url());
    tracing::info!(
        "Rate limit: {} requests per {} ms",
        settings.gateway.rate_limit.max_requests,
        settings.gateway.rate_limit.window.as_millis()
    );
    tracing::info!(
        "Cache freshness: {} ms",
        settings.gateway.cache.freshness.as_millis()
    );

    let prometheus_handle = init_metrics().context("failed to install metrics recorder")?;

    let client = CoinMarketCapClient::new(settings.upstream.clone())
        .context("failed to build upstream client")?;
    let upstream: Arc<dyn MarketDataSource> = Arc::new(client);

    let gateway = Gateway::new(settings.gateway.clone(), upstream);
    let state = AppState::new(gateway);

    run_server(&settings, state, prometheus_handle).await?;

    Ok(())
}
