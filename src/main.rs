use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tvio_api::{
    db::{create_pool, create_redis_client, Cache, MemoryProfileStore, PgProfileStore, ProfileStore},
    routes::{create_router, AppState},
    services::{MetadataProvider, Recommender, RecommenderSettings, TmdbProvider},
    Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tvio_api=info,tvio_server=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn ProfileStore> = match &config.database_url {
        Some(database_url) => {
            let store = PgProfileStore::new(create_pool(database_url).await?);
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, ratings are kept in memory only");
            Arc::new(MemoryProfileStore::new())
        }
    };

    let (cache, cache_writer) = match &config.redis_url {
        Some(redis_url) => {
            let (cache, handle) = Cache::new(create_redis_client(redis_url)?);
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let provider: Arc<dyn MetadataProvider> = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));

    let recommender = Recommender::new(
        store.clone(),
        provider.clone(),
        RecommenderSettings {
            similar_users: config.similar_users,
            page_size: config.page_size,
        },
    );

    tracing::info!(
        store = store.name(),
        provider = provider.name(),
        cache = cache_writer.is_some(),
        similar_users = config.similar_users,
        page_size = config.page_size,
        "Services initialized"
    );

    let state = Arc::new(AppState {
        store,
        provider,
        recommender,
        image_base_url: config.tmdb_image_base_url.clone(),
    });
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
