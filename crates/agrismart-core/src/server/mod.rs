//! HTTP server for AgriSmart Core.
//!
//! Agent operations are exposed below `/api/{climate,crop,water,yield,farm}`,
//! farm records below `/api/farms`, plus `/`, `/health` and `/api/agents`.

pub mod error;
pub mod logging;
pub mod routes;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::agents::FarmManager;
use crate::config::{Config, ServerConfig};
use crate::error::Result;
use crate::storage::Database;
use error::{ApiError, ApiResult};
use logging::RequestLoggerLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub farm_manager: Arc<FarmManager>,
    pub db: Arc<Mutex<Database>>,
}

impl AppState {
    pub fn new(farm_manager: FarmManager, db: Database) -> Self {
        Self { farm_manager: Arc::new(farm_manager), db: Arc::new(Mutex::new(db)) }
    }

    /// Acquires the database lock.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the lock is poisoned.
    pub fn lock_db(&self) -> ApiResult<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|e| {
            error!(error = %e, "Failed to acquire database lock");
            ApiError::Internal("Database lock error".to_string())
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|origin| origin.trim() == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Builds the application router with CORS, tracing and request-id layers.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(routes::service::root))
        .route("/health", get(routes::service::health))
        .nest("/api", routes::api())
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(RequestLoggerLayer)
        .with_state(state)
}

/// Start the AgriSmart HTTP server.
///
/// # Errors
///
/// Returns an error if the model credential is missing, the database cannot
/// be opened, or the server fails to bind to the configured address.
pub async fn run(config: &Config) -> Result<()> {
    let farm_manager = FarmManager::from_config(&config.model)?;
    let db = Database::open_or_in_memory(config.storage.path.as_deref())?;
    info!(
        model = %farm_manager.model_id(),
        storage = config.storage.path.as_deref().unwrap_or(":memory:"),
        "Agents and document store ready"
    );

    let app = build_router(AppState::new(farm_manager, db), &config.server);

    let addr = config.server.address;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "AgriSmart server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
