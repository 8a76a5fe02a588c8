mod audio;
mod config;
mod errors;
mod interview;
mod llm_client;
mod models;
mod provider;
mod resume;
mod routes;
mod state;
mod storage;
mod subscribe;
mod tasks;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::audio::transcriber::select_transcriber;
use crate::config::Config;
use crate::provider::select_provider;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::Store;
use crate::tasks::{JobContext, TaskQueue};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(Store::open(config.upload_dir.clone()).await?);
    info!("Upload root: {}", store.root().display());

    let provider = select_provider(&config)?;
    let transcriber = select_transcriber(&config)?;

    let tasks = TaskQueue::start(
        config.task_workers,
        JobContext {
            provider: provider.clone(),
            transcriber,
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .context("Failed to build HTTP client")?,
        },
    );

    let state = AppState {
        config: config.clone(),
        store,
        provider,
        tasks,
        subscriptions: Default::default(),
    };

    let origin: HeaderValue = config
        .frontend_url
        .parse()
        .with_context(|| format!("Invalid FRONTEND_URL '{}'", config.frontend_url))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
