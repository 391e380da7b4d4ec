use std::sync::Arc;

use axum::http::HeaderValue;
use token_drop::{
    adapters::repositories::create_token_repository,
    application::services::{RandomTokenGenerator, TokenGenerator},
    create_router,
    domain::config::local::LocalConfig,
    services, AppState, FileManager,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = LocalConfig::from_env().expect("ERROR: Invalid configuration");

    tracing::info!(
        storage = ?config.storage,
        upload_dir = %config.upload_dir.display(),
        max_token_attempts = config.max_token_attempts,
        "Starting token-drop"
    );

    // Configure CORS
    let cors = match &config.cors_allowed_origins {
        Some(allowed_origins) => {
            let origins: Vec<HeaderValue> = allowed_origins
                .iter()
                .map(|s| s.parse().expect("Invalid CORS origin"))
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        // Allow all origins if not specified (only for development)
        None => CorsLayer::permissive(),
    };

    // Create storage service and token registry in parallel
    let (storage_service, token_repo) = tokio::join!(
        async {
            services::create_storage_service(&config)
                .await
                .expect("ERROR: Failed to create storage service. Check UPLOAD_DIR permissions.")
        },
        async {
            create_token_repository(&config.registry)
                .await
                .expect("ERROR: Failed to open token registry. Check REGISTRY_URL and connectivity.")
        }
    );
    tracing::info!("Backends initialized");

    let file_manager = FileManager::new(
        storage_service,
        token_repo,
        Arc::new(RandomTokenGenerator) as Arc<dyn TokenGenerator>,
        config.max_token_attempts,
    );

    let app_state = AppState {
        file_manager: file_manager.clone(),
        max_upload_bytes: config.max_upload_bytes,
    };

    let router = create_router(app_state).layer(cors);

    // Start the server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", config.port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    file_manager.close().await;
    tracing::info!("Server stopped");
}
