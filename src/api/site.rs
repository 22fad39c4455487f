//! Site pages and the demo data endpoint

use axum::{
    extract::State,
    http::Uri,
    response::Html,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tera::Context as TeraContext;

use crate::api::middleware::{ApiError, AppState};
use crate::templates::StandardVars;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/api/data", get(api_data))
}

/// Payload of `/api/data`
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub items: Vec<DataItem>,
}

#[derive(Debug, Serialize)]
pub struct DataItem {
    pub id: i64,
    pub name: String,
}

async fn home(State(state): State<AppState>, uri: Uri) -> Result<Html<String>, ApiError> {
    let posts = state.post_service.list_published().await?;

    let mut context = TeraContext::new();
    context.insert("title", "Home Page");
    context.insert("message", &state.config.site.tagline);
    context.insert("posts", &posts);

    render(&state, "home.html", &context, &uri)
}

async fn about(State(state): State<AppState>, uri: Uri) -> Result<Html<String>, ApiError> {
    let mut context = TeraContext::new();
    context.insert("title", "About Us");
    context.insert("description", &state.config.site.description);

    render(&state, "about.html", &context, &uri)
}

async fn contact(State(state): State<AppState>, uri: Uri) -> Result<Html<String>, ApiError> {
    let mut context = TeraContext::new();
    context.insert("title", "Contact Us");
    context.insert("email", &state.config.site.contact_email);
    context.insert("phone", &state.config.site.contact_phone);

    render(&state, "contact.html", &context, &uri)
}

async fn api_data() -> Json<DataResponse> {
    let items = (1..=3)
        .map(|id| DataItem {
            id,
            name: format!("Item {}", id),
        })
        .collect();

    Json(DataResponse {
        status: "success",
        message: "This is API data",
        timestamp: Utc::now().to_rfc3339(),
        items,
    })
}

fn render(
    state: &AppState,
    template: &str,
    context: &TeraContext,
    uri: &Uri,
) -> Result<Html<String>, ApiError> {
    let vars = StandardVars::new(&state.config.site, uri.path());
    let html = state.renderer.render(template, context, &vars)?;
    Ok(Html(html))
}
