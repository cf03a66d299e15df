use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use catalog_http::{ApiJson, ApiPath, AppError};

use super::models::BookDto;
use super::service::BookService;

pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(service)
}

async fn list_books(
    State(service): State<Arc<BookService>>,
) -> Result<Json<Vec<BookDto>>, AppError> {
    Ok(Json(service.get_all().await?))
}

async fn get_book(
    State(service): State<Arc<BookService>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<BookDto>, AppError> {
    Ok(Json(service.get_by_id(id).await?))
}

async fn create_book(
    State(service): State<Arc<BookService>>,
    ApiJson(dto): ApiJson<BookDto>,
) -> Result<impl IntoResponse, AppError> {
    let created = service.add(&dto).await?;
    let location = format!("/api/books/{}", created.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(created)))
}

async fn update_book(
    State(service): State<Arc<BookService>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(dto): ApiJson<BookDto>,
) -> Result<StatusCode, AppError> {
    service.update(id, &dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_book(
    State(service): State<Arc<BookService>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
