mod config;
mod conversation;
mod db;
mod document;
mod errors;
mod models;
mod render;
mod resumes;
mod routes;
mod state;
mod storage;
mod translation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::conversation::service::ConversationService;
use crate::conversation::store::RedisSessionStore;
use crate::db::create_pool;
use crate::render::latex::LatexRenderer;
use crate::resumes::finalize::FinalizePipeline;
use crate::resumes::repository::PgResumeRepository;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::s3::S3ArtifactStore;
use crate::translation::client::LlmClient;
use crate::translation::TranslationService;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume builder API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis session store
    let redis = redis::Client::open(config.redis_url.clone())?;
    let sessions = Arc::new(RedisSessionStore::new(redis, config.session_ttl_seconds));
    info!("Redis session store initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let artifacts: Arc<dyn crate::storage::ArtifactStore> =
        Arc::new(S3ArtifactStore::new(s3, config.s3_bucket.clone()));
    info!("S3 client initialized");

    // Initialize LLM client for translation
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    let translator = TranslationService::new(llm);
    info!(
        "LLM client initialized (model: {})",
        translation::client::MODEL
    );

    let resumes: Arc<dyn crate::resumes::repository::ResumeRepository> =
        Arc::new(PgResumeRepository::new(db));
    let renderer: Arc<dyn crate::render::DocumentRenderer> = Arc::new(LatexRenderer::default());

    let pipeline = FinalizePipeline::new(
        Arc::clone(&resumes),
        Arc::clone(&renderer),
        Arc::clone(&artifacts),
    );
    let conversation = Arc::new(ConversationService::new(
        sessions,
        pipeline,
        Arc::clone(&artifacts),
    ));

    let state = AppState {
        resumes,
        renderer,
        artifacts,
        translator,
        conversation,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "resume-builder-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
