//! Category endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, ApiJson, ApiPath, ApiQuery, AppState};
use crate::models::{Category, CategoryFilter, CreateCategoryInput, UpdateCategoryInput};

pub fn public_router() -> Router<AppState> {
    Router::new().route("/categories", get(list_all))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state
        .category_service
        .list(&CategoryFilter::default())
        .await?;
    Ok(Json(categories))
}

async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<CategoryFilter>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.category_service.list(&filter).await?;
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateCategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.category_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Category>, ApiError> {
    let category = state.category_service.get(id).await?;
    Ok(Json(category))
}

async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateCategoryInput>,
) -> Result<Json<Category>, ApiError> {
    let category = state.category_service.update(id, input).await?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.category_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
