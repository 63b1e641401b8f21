use crate::config::Config;
use crate::images::{ImageService, IMAGE_CACHE_CONTROL};
use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method, Response, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{fs::ServeFileSystemResponseBody, ServeDir},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use vitae_common::paths::UPLOADS_PREFIX;

pub mod error;
pub mod openapi;
pub mod routes_images;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Upload storage and credential records
    pub images: Arc<ImageService>,
}

impl AppContext {
    pub fn new(config: Config, images: ImageService) -> Self {
        Self {
            config: Arc::new(config),
            images: Arc::new(images),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let uploads = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            cache_found_files::<ServeFileSystemResponseBody>,
        ))
        .service(ServeDir::new(ctx.images.storage().dir()));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Image API and its OpenAPI document
        .nest(
            "/api",
            routes_images::image_routes().merge(openapi::openapi_routes()),
        )
        // Uploaded files
        .nest_service(UPLOADS_PREFIX, uploads)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Cache-Control for served uploads; errors such as 404 are left uncached.
fn cache_found_files<B>(response: &Response<B>) -> Option<HeaderValue> {
    let status = response.status();
    (status.is_success() || status == StatusCode::NOT_MODIFIED)
        .then(|| HeaderValue::from_static(IMAGE_CACHE_CONTROL))
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(ctx: AppContext) -> Result<()> {
    let server = &ctx.config.server;
    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .context("Invalid server address")?;

    let app = create_router(ctx);

    tracing::info!("Starting image server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
