use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use catalog_http::{ApiJson, ApiPath, AppError};

use super::models::CategoryDto;
use super::service::CategoryService;

pub fn router(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .with_state(service)
}

async fn list_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<Vec<CategoryDto>>, AppError> {
    Ok(Json(service.get_all().await?))
}

async fn get_category(
    State(service): State<Arc<CategoryService>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<CategoryDto>, AppError> {
    Ok(Json(service.get_by_id(id).await?))
}

async fn create_category(
    State(service): State<Arc<CategoryService>>,
    ApiJson(dto): ApiJson<CategoryDto>,
) -> Result<impl IntoResponse, AppError> {
    let created = service.add(&dto).await?;
    let location = format!("/api/categories/{}", created.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(created)))
}

async fn update_category(
    State(service): State<Arc<CategoryService>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(dto): ApiJson<CategoryDto>,
) -> Result<StatusCode, AppError> {
    service.update(id, &dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
