use std::sync::Arc;
use std::time::Duration;

use stockview_core::batch::BatchOrchestrator;
use stockview_core::series::SeriesStore;
use stockview_market_data::{FetcherConfig, HistoryProvider, MarketDataFetcher, YahooProvider};
use stockview_storage_sqlite::{db, SeriesRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub orchestrator: Arc<BatchOrchestrator>,
    pub series_store: Arc<dyn SeriesStore>,
    /// Upper bound on one `POST /charts` batch.
    pub chart_timeout: Duration,
}

pub fn init_tracing() {
    let log_format = std::env::var("SV_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // `try_init` so repeated calls (tests) do not panic.
    let result = if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init()
    };
    if let Err(e) = result {
        eprintln!("Tracing already initialised: {}", e);
    }
}

/// Open the database and wire the pipeline against the Yahoo provider.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider = YahooProvider::new()?;
    build_state_with_provider(config, Arc::new(provider)).await
}

/// Same as [`build_state`] with a caller-supplied history provider.
pub async fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn HistoryProvider>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let series_store: Arc<dyn SeriesStore> =
        Arc::new(SeriesRepository::new(pool.clone(), writer));

    let fetcher_config = FetcherConfig {
        deadline: config.fetch_timeout,
        max_retries: config.fetch_max_retries,
        ..FetcherConfig::default()
    };
    let fetcher = Arc::new(MarketDataFetcher::with_config(provider, fetcher_config));
    tracing::info!(
        "Fetching from {} with up to {} symbols in flight",
        fetcher.provider_id(),
        config.max_concurrency
    );

    let orchestrator = Arc::new(
        BatchOrchestrator::new(fetcher, series_store.clone())
            .with_max_concurrency(config.max_concurrency),
    );

    Ok(Arc::new(AppState {
        orchestrator,
        series_store,
        chart_timeout: config.request_timeout,
    }))
}
