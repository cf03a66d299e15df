use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use catalog_http::{ApiJson, AppError, CurrentUser};

use super::models::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};
use super::service::AuthService;

pub fn router(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/refresh", post(refresh))
        .with_state(service)
}

async fn register(
    State(service): State<Arc<AuthService>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    Ok(Json(service.register(request).await?))
}

async fn login(
    State(service): State<Arc<AuthService>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    Ok(Json(service.login(request).await?))
}

async fn me(
    State(service): State<Arc<AuthService>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<MeResponse>, AppError> {
    Ok(Json(service.me(&principal).await?))
}

/// Always 501; no refresh tokens are issued.
async fn refresh(State(service): State<Arc<AuthService>>) -> Result<Json<AuthResponse>, AppError> {
    Ok(Json(service.refresh().await?))
}
