use anyhow::Result;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voice_color_api::{
    ai::{GeminiClient, VoiceAnalyzer},
    config::Config,
    routes,
    state::AppState,
    storage::{ObjectStore, R2Client},
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    tracing::info!("Starting voice color relay...");

    let config = Config::from_env()?;
    tracing::info!(
        "Loaded configuration: server={}:{}",
        config.server.host,
        config.server.port
    );

    let analyzer: Option<Arc<dyn VoiceAnalyzer>> = match GeminiClient::from_config(&config.gemini) {
        Some(client) => {
            tracing::info!("Gemini client ready (model={})", config.gemini.model);
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set - /analyze will answer with a configuration error");
            None
        }
    };

    let store: Option<Arc<dyn ObjectStore>> = if config.has_r2_credentials() {
        let r2 = R2Client::new(&config.cloudflare)?;
        Some(Arc::new(r2))
    } else {
        tracing::warn!("R2 credentials not found - snapshot uploads disabled");
        None
    };

    let addr = config.server_address();
    let state = AppState::new(config, analyzer, store);

    let app = routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(CompressionLayer::new()),
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voice_color_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
