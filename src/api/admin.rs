//! Administrative API
//!
//! Mounted under `/api/v1/admin`. Serves the admin registry and the
//! unrestricted CRUD routes of each entity.

use axum::{extract::State, routing::get, Json, Router};

use crate::admin::AdminSite;
use crate::api::middleware::AppState;
use crate::api::{categories, comments, posts};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/models", get(list_models))
        .merge(posts::admin_router())
        .merge(comments::admin_router())
        .merge(categories::admin_router())
}

/// Per-entity admin configuration
async fn list_models(State(state): State<AppState>) -> Json<AdminSite> {
    Json(state.admin_site.as_ref().clone())
}
