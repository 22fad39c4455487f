//! HTTP layer - handlers and routing
//!
//! - Site pages (`/`, `/about`, `/contact`, `/api/data`)
//! - Public JSON API under `/api/v1`
//! - Administrative JSON API under `/api/v1/admin`
//! - Static files under `/static`

pub mod admin;
pub mod categories;
pub mod comments;
pub mod middleware;
pub mod posts;
pub mod site;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use std::path::Path;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{ApiError, ApiJson, ApiPath, ApiQuery, AppState};

/// Build the `/api/v1` router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .merge(posts::public_router())
        .merge(comments::public_router())
        .merge(categories::public_router())
        .nest("/admin", admin::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str, static_dir: &Path) -> Router {
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            tracing::warn!("Invalid CORS origin '{}', cross-origin requests disabled", cors_origin);
            CorsLayer::new()
        }
    }
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(site::router())
        .nest("/api/v1", build_api_router())
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
