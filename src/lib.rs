use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod files;
pub mod metadata;
pub mod storage;

pub use config::{Config, ConfigError, UploadMode};
pub use error::{Result, UploadError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Serializes requests that write into the shared folder.
    pub shared_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            shared_lock: Arc::new(Mutex::new(())),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/upload", post(files::upload_files))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
