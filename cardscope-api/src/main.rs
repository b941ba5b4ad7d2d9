use anyhow::Context;
use cardscope_api::{app, AppState};
use cardscope_core::{MerchantDirectory, ProfileStore, RewardProvider};
use cardscope_refresh::{
    BackoffPolicy, OpenAiRewardProvider, RefreshOrchestrator, RefreshScheduler, TokioSleeper,
    WorkerPool,
};
use cardscope_rewards::{
    default_aliases, CategoryMatcher, RateExtractor, RewardResolver, SuggestionEngine,
};
use cardscope_store::app_config::Config;
use cardscope_store::{InMemoryMerchantDirectory, InMemoryProfileStore, PgStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cardscope_api=debug,cardscope_refresh=info,cardscope_rewards=info,\
                 tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting CardScope API on port {}", config.server.port);

    let (profiles, merchants) = connect_store(&config).await?;

    // Rewards engine
    let aliases = config.rewards.aliases.clone().unwrap_or_else(default_aliases);
    let resolver = RewardResolver::new(
        Arc::new(RateExtractor::new()?),
        Arc::new(CategoryMatcher::new(&aliases)),
    );
    let engine = Arc::new(SuggestionEngine::new(profiles.clone(), merchants, resolver));

    // Provider
    if config.provider.api_key.is_empty() {
        tracing::warn!("No provider API key configured, reward refresh will fail until one is set");
    }
    let provider: Arc<dyn RewardProvider> = Arc::new(OpenAiRewardProvider::new(&config.provider)?);

    // Background refresh
    let shutdown = CancellationToken::new();
    let pool = Arc::new(WorkerPool::new(config.refresh.workers, config.refresh.queue_capacity));
    let orchestrator = RefreshOrchestrator::new(
        profiles.clone(),
        provider.clone(),
        pool.clone(),
        BackoffPolicy::from_config(&config.refresh),
        Arc::new(TokioSleeper),
        shutdown.clone(),
    );
    let scheduler = RefreshScheduler::new(
        Arc::new(orchestrator),
        Duration::from_secs(config.refresh.interval_seconds),
        shutdown.clone(),
    );
    let scheduler_task = tokio::spawn(scheduler.run());

    let app_state = AppState {
        engine,
        profiles,
        provider,
    };
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    pool.close();
    scheduler_task.await?;
    tracing::info!("CardScope API stopped");
    Ok(())
}

async fn connect_store(
    config: &Config,
) -> anyhow::Result<(Arc<dyn ProfileStore>, Arc<dyn MerchantDirectory>)> {
    match &config.database.url {
        Some(url) => {
            let db = PgStore::new(url)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await?;

            for card in &config.rewards.cards {
                db.register_card(&card.issuer, &card.product)
                    .await
                    .map_err(|e| anyhow::anyhow!(e))
                    .context("Failed to seed card catalogue")?;
            }
            for (merchant, category) in &config.rewards.merchants {
                db.upsert_merchant(merchant, category).await?;
            }

            let db = Arc::new(db);
            let profiles: Arc<dyn ProfileStore> = db.clone();
            let merchants: Arc<dyn MerchantDirectory> = db;
            Ok((profiles, merchants))
        }
        None => {
            tracing::warn!("No database configured, using the in-memory store");
            let store = InMemoryProfileStore::new();
            for card in &config.rewards.cards {
                store
                    .register_card(&card.issuer, &card.product)
                    .await
                    .map_err(|e| anyhow::anyhow!(e))?;
            }
            let profiles: Arc<dyn ProfileStore> = Arc::new(store);
            let merchants: Arc<dyn MerchantDirectory> =
                Arc::new(InMemoryMerchantDirectory::from_entries(&config.rewards.merchants));
            Ok((profiles, merchants))
        }
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
