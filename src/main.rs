//! Univers Bâti Groupe site backend
//!
//! Serves the company settings, project catalogue and quote requests behind a
//! single admin context, persisted through SQLite or a hosted table service.

mod api;
mod auth;
mod config;
mod context;
mod errors;
mod gateway;
mod local;
mod models;
mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, GatewayKind};
use context::AdminContext;
use errors::AppError;
use gateway::{Gateway, RestGateway, SqliteGateway};
use local::LocalStorage;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<AdminContext>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Univers Bâti Groupe site backend");
    tracing::info!("Gateway: {:?}", config.gateway);
    tracing::info!("Local state path: {:?}", config.local_state_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    let gateway = build_gateway(&config).await?;
    let storage = Arc::new(LocalStorage::open(&config.local_state_path).await);

    tracing::info!("Loading site content...");
    let context = AdminContext::init(gateway, storage).await;
    if context.is_logged_in() {
        tracing::warn!("Admin session restored from local state");
    }

    let state = AppState {
        context: Arc::new(context),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Connect the table store selected by the configuration.
async fn build_gateway(config: &Config) -> Result<Arc<dyn Gateway>, AppError> {
    match config.gateway {
        GatewayKind::Sqlite => {
            tracing::info!("Database path: {:?}", config.db_path);
            let pool = gateway::init_database(&config.db_path).await?;
            Ok(Arc::new(SqliteGateway::new(pool)))
        }
        GatewayKind::Rest => {
            let (Some(url), Some(key)) = (&config.rest_url, &config.rest_key) else {
                return Err(AppError::BadRequest(
                    "REST gateway requires a URL and an API key".to_string(),
                ));
            };
            tracing::info!("Table service: {}", url);
            Ok(Arc::new(RestGateway::new(url, key)?))
        }
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public pages and the quote form
    let public_routes = Router::new()
        .route("/context", get(api::get_context))
        .route("/settings", get(api::get_settings))
        .route("/projects", get(api::list_projects))
        .route("/projects/{id}", get(api::get_project))
        .route("/quote-requests", post(api::submit_quote_request))
        .route("/session", get(api::get_session))
        .route("/session/login", post(api::login))
        .route("/session/logout", post(api::logout));

    // Back office, behind the admin session flag
    let admin_routes = Router::new()
        .route("/settings", put(api::update_settings))
        .route("/projects", post(api::create_project))
        .route("/projects/refresh", post(api::refresh_projects))
        .route(
            "/projects/{id}",
            put(api::update_project).delete(api::delete_project),
        )
        .route("/quote-requests", get(api::list_quote_requests))
        .route("/quote-requests/refresh", post(api::refresh_quote_requests))
        .route(
            "/quote-requests/{id}/status",
            put(api::update_quote_request_status),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes.merge(admin_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
