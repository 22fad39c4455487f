//! Comment endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, ApiJson, ApiPath, ApiQuery, AppState};
use crate::models::{Comment, CommentFilter, CreateCommentInput, UpdateCommentApproval};

/// Comment body as submitted by a visitor; the post comes from the path
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitCommentRequest {
    pub name: String,
    pub email: String,
    pub text: String,
}

pub fn public_router() -> Router<AppState> {
    Router::new().route(
        "/posts/{id}/comments",
        get(list_approved).post(submit_comment),
    )
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/comments", get(list_comments))
        .route("/comments/{id}", get(get_comment).delete(delete_comment))
        .route("/comments/{id}/approval", put(set_approval))
}

async fn list_approved(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i64>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = state.comment_service.list_for_post(post_id, true).await?;
    Ok(Json(comments))
}

async fn submit_comment(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i64>,
    ApiJson(body): ApiJson<SubmitCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let input = CreateCommentInput::new(post_id, body.name, body.email, body.text);
    let comment = state.comment_service.create(input).await?;
    tracing::info!(
        comment_id = comment.id,
        post_id,
        "Comment submitted, awaiting moderation"
    );
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<CommentFilter>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = state.comment_service.list(&filter).await?;
    Ok(Json(comments))
}

async fn get_comment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state.comment_service.get(id).await?;
    Ok(Json(comment))
}

async fn set_approval(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateCommentApproval>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state.comment_service.set_approval(id, body.approved).await?;
    Ok(Json(comment))
}

async fn delete_comment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.comment_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
