use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use connectwell_api::ai::gemini::GeminiClient;
use connectwell_api::ai::image::GeminiImageGenerator;
use connectwell_api::ai::moderation::GeminiModerator;
use connectwell_api::ai::{ImageGenerator, ModerationService};
use connectwell_api::auth::identity::DemoIdentityProvider;
use connectwell_api::config::Config;
use connectwell_api::db::kv::{KeyValueStore, MemoryKv};
use connectwell_api::db::pg::PgStore;
use connectwell_api::db::store::{ContentStore, MemoryStore};
use connectwell_api::enrichment::EnrichmentQueue;
use connectwell_api::revalidate::Revalidator;
use connectwell_api::AppState;

/// Delay between background icon generation attempts.
const ENRICHMENT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing, env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    let store: Arc<dyn ContentStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool =
                connectwell_api::db::pool::connect(url).expect("failed to build database pool");
            tracing::info!("using PostgreSQL content store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; content is kept in memory and lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Sessions live in process memory; every restart logs everyone out.
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKv::new());

    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; moderation and image generation are disabled");
    }
    let timeout = Duration::from_secs(config.ai_timeout_secs);
    let moderator: Arc<dyn ModerationService> = Arc::new(GeminiModerator::new(
        GeminiClient::new(&config.gemini_api_base, config.gemini_api_key.clone(), timeout),
        config.moderation_model.clone(),
    ));
    let images: Arc<dyn ImageGenerator> = Arc::new(GeminiImageGenerator::new(
        GeminiClient::new(&config.gemini_api_base, config.gemini_api_key.clone(), timeout),
        config.image_model.clone(),
    ));

    let revalidator = Revalidator::new();
    let enrichment = EnrichmentQueue::spawn(
        store.clone(),
        images.clone(),
        revalidator.clone(),
        ENRICHMENT_RETRY_DELAY,
    );

    let state = AppState {
        store,
        kv,
        config: Arc::new(config),
        moderator,
        images,
        identity: Arc::new(DemoIdentityProvider),
        revalidator,
        enrichment,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(connectwell_api::routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "connectwell-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
