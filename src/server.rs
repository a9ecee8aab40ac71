/// Server setup and initialization
///
/// Wires together all components: database, storage, sessions, templates
/// and HTTP routes. Provides the main application factory for the Axum app.

use crate::{
    api::{create_home_routes, create_project_routes, create_user_routes, AppState},
    config::Config,
    database,
    project::ProjectStorage,
    session::{session_layer, SessionStore},
    user::UserStorage,
    views::Views,
};
use anyhow::Result;
use axum::{middleware, routing::get, Router};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Build the shared application state from configuration
///
/// Opens the database pool (creating the schema when needed), the session
/// store and the compiled templates.
pub async fn create_state(config: &Config) -> Result<AppState> {
    tracing::info!("🗄️ Initializing document database");
    let pool = database::open(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database '{}': {}", config.database.url, e))?;

    tracing::info!("🎨 Compiling page templates");
    let views = Views::new().map_err(|e| anyhow::anyhow!("Failed to compile templates: {}", e))?;

    tracing::info!("🍪 Initializing session store (ttl {}s)", config.session.ttl_secs);
    let sessions = Arc::new(SessionStore::new(config.session.clone()));
    sessions.spawn_cleanup(Duration::from_secs(config.session.cleanup_interval_secs));

    Ok(AppState {
        users: UserStorage::new(pool.clone()),
        projects: ProjectStorage::new(pool),
        sessions,
        views: Arc::new(views),
    })
}

/// Assemble the router for an already built state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Homepage, login, signup, logout, error
        .merge(create_home_routes())
        // Profiles
        .merge(create_user_routes())
        // Projects and membership
        .merge(create_project_routes())
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.sessions),
            session_layer,
        ))
        .with_state(state)
}

/// Create the main Axum application with all routes and middleware
pub async fn create_app(config: Config) -> Result<Router> {
    let state = create_state(&config).await?;

    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = build_router(state);

    tracing::info!("✅ Application initialized successfully");
    Ok(app)
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("projboard=info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting projboard server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
