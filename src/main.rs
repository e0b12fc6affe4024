use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use video_upload_server::{router, storage, AppState, Config};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting video upload server...");

    let config = Config::from_env().expect("Invalid configuration");
    storage::prepare_root(&config.uploads_dir, config.mode)
        .await
        .expect("Failed to prepare uploads directory");

    tracing::info!(
        "Upload mode: {:?}, storing under {}",
        config.mode,
        config.uploads_dir.display()
    );

    let addr = config.addr();
    let app = router(AppState::new(config));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
