pub mod request_id;

use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::controllers::{health, translation::TranslationController};
use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;
use request_id::request_id_middleware;

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    translation_controller: Arc<TranslationController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let translation_routes = Router::new()
        .route(
            "/translatewordengtojap",
            post(TranslationController::resolve_word),
        )
        .route(
            "/getaudioforusagephrases",
            post(TranslationController::resolve_usage_audio),
        )
        .route("/gettranslation", get(TranslationController::lookup))
        .with_state(translation_controller.clone());

    // The original deployment served browser clients from any origin
    let app = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool.clone())
        .merge(translation_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
