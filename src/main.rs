use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinemascope::{
    config::Config,
    db::{create_redis_client, Cache, CacheWriterHandle, Catalog},
    models::GenreVocabulary,
    routes::{create_router, AppState},
    services::{MetadataService, RecommendationService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinemascope=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog = Catalog::load(&config.movie_data_path, &config.movie_titles_path)
        .with_context(|| {
            format!(
                "Failed to load catalog from {} and {}",
                config.movie_data_path, config.movie_titles_path
            )
        })?;

    let genres = GenreVocabulary::default();
    if catalog.feature_len() != genres.len() + 1 {
        tracing::warn!(
            feature_len = catalog.feature_len(),
            genres = genres.len(),
            "Feature length does not match the genre vocabulary, preference-based requests will fail"
        );
    }

    let (cache, cache_writer) = match &config.redis_url {
        Some(redis_url) => {
            let client = create_redis_client(redis_url)?;
            let (cache, writer) = Cache::new(client);
            tracing::info!("Metadata cache enabled");
            (Some(cache), Some(writer))
        }
        None => {
            tracing::info!("REDIS_URL not set, metadata cache disabled");
            (None, None)
        }
    };

    let metadata = MetadataService::from_config(&config, cache)?;

    let state = Arc::new(AppState {
        recommender: Arc::new(RecommendationService::new(Arc::new(catalog), genres)),
        metadata: Arc::new(metadata),
        max_recommendations: config.max_recommendations,
    });

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    flush_cache(cache_writer).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn flush_cache(writer: Option<CacheWriterHandle>) {
    if let Some(writer) = writer {
        writer.shutdown().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut signal = installed_or_pending(
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()),
            "SIGTERM",
        )
        .await;
        signal.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Unwraps a signal handler, or never resolves if it could not be installed so the
/// remaining signals still govern shutdown
async fn installed_or_pending<T>(installed: std::io::Result<T>, signal: &str) -> T {
    match installed {
        Ok(handler) => handler,
        Err(e) => {
            tracing::error!("Failed to install {} handler: {}", signal, e);
            std::future::pending().await
        }
    }
}
