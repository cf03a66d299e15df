use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use catalog_http::{ApiJson, ApiPath, AppError};

use super::models::AuthorDto;
use super::service::AuthorService;

pub fn router(service: Arc<AuthorService>) -> Router {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route(
            "/{id}",
            get(get_author).put(update_author).delete(delete_author),
        )
        .with_state(service)
}

async fn list_authors(
    State(service): State<Arc<AuthorService>>,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    Ok(Json(service.get_all().await?))
}

async fn get_author(
    State(service): State<Arc<AuthorService>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<AuthorDto>, AppError> {
    Ok(Json(service.get_by_id(id).await?))
}

async fn create_author(
    State(service): State<Arc<AuthorService>>,
    ApiJson(dto): ApiJson<AuthorDto>,
) -> Result<impl IntoResponse, AppError> {
    let created = service.add(&dto).await?;
    let location = format!("/api/authors/{}", created.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(created)))
}

async fn update_author(
    State(service): State<Arc<AuthorService>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(dto): ApiJson<AuthorDto>,
) -> Result<StatusCode, AppError> {
    service.update(id, &dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_author(
    State(service): State<Arc<AuthorService>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
