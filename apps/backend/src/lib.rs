pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use repertoire_core::Scheduler;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(db),
            scheduler: Arc::new(Scheduler::default()),
        }
    }
}

/// Full application router
pub fn build_router(state: AppState) -> Router {
    // Every /api route needs a caller identity
    let api_routes = Router::new()
        // Opening routes
        .route("/api/openings", get(routes::openings::list))
        .route("/api/openings/seed", post(routes::openings::seed))
        .route("/api/openings/{opening_id}", get(routes::openings::get_one))
        // Progress routes
        .route("/api/progress/toggle", post(routes::progress::toggle))
        // Practice routes
        .route("/api/practice/next", get(routes::practice::next))
        .route("/api/practice/submit", post(routes::practice::submit))
        .route("/api/practice/stats", get(routes::practice::stats))
        .layer(middleware::from_fn(routes::identity::identify_user));

    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    if config.seed_openings {
        services::catalog::seed_builtin(&db).await?;
    }

    let app = build_router(AppState::new(db));

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
