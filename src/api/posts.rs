//! Blog post endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, ApiJson, ApiPath, ApiQuery, AppState};
use crate::models::{BlogPost, CreatePostInput, PostFilter, UpdatePostInput};

/// Public routes: published posts only
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_published))
        .route("/posts/{id}", get(view_published))
}

/// Admin routes: every post, with search and filters
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}

async fn list_published(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let posts = state.post_service.list_published().await?;
    Ok(Json(posts))
}

/// Fetch a published post and record the view
async fn view_published(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<BlogPost>, ApiError> {
    let post = state.post_service.view_published(id).await?;
    Ok(Json(post))
}

async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PostFilter>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let posts = state.post_service.list(&filter).await?;
    Ok(Json(posts))
}

async fn create_post(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreatePostInput>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    let post = state.post_service.create(input).await?;
    tracing::info!(post_id = post.id, "Post created via admin API");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn get_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<BlogPost>, ApiError> {
    let post = state.post_service.get(id).await?;
    Ok(Json(post))
}

async fn update_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdatePostInput>,
) -> Result<Json<BlogPost>, ApiError> {
    let post = state.post_service.update(id, input).await?;
    Ok(Json(post))
}

async fn delete_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.post_service.delete(id).await?;
    tracing::info!(post_id = id, "Post deleted via admin API");
    Ok(StatusCode::NO_CONTENT)
}
