mod config;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::{Json, Router, extract::DefaultBodyLimit, http::HeaderValue, routing::get};
use bytes::Bytes;
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use scribe_api::{AppState, AppStateInner, FallbackImage};
use scribe_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribe=debug,scribe_api=debug,scribe_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;

    let fallback_image = match &config.fallback_image {
        Some(path) => load_fallback_image(path).await?,
        None => FallbackImage::default(),
    };

    let state: AppState = Arc::new(AppStateInner { db, fallback_image });

    let cors = match &config.cors_origin {
        Some(origin) => {
            let origin: HeaderValue = origin
                .parse()
                .with_context(|| format!("SCRIBE_CORS_ORIGIN: invalid origin {:?}", origin))?;
            CorsLayer::permissive().allow_origin(AllowOrigin::exact(origin))
        }
        None => CorsLayer::permissive(),
    };

    let app = Router::new()
        .nest("/api", scribe_api::router(state))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Scribe listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn load_fallback_image(path: &Path) -> anyhow::Result<FallbackImage> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read fallback image {}", path.display()))?;

    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };

    info!("Using fallback image {} ({} bytes)", path.display(), data.len());
    Ok(FallbackImage {
        content_type: content_type.to_string(),
        data: Bytes::from(data),
    })
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
