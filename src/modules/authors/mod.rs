pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use catalog_kernel::{InitCtx, Migration, Module};

use self::models::AuthorDto;
use self::service::AuthorService;
use super::{crud_paths, schema_json};

pub struct AuthorsModule {
    service: Arc<AuthorService>,
}

impl AuthorsModule {
    pub fn new(service: Arc<AuthorService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": crud_paths("Authors", "Author", "AuthorDto", true),
            "components": {
                "schemas": { "AuthorDto": schema_json::<AuthorDto>() }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_authors",
            up: r#"
                CREATE TABLE IF NOT EXISTS authors (
                    id        SERIAL PRIMARY KEY,
                    name      VARCHAR(150) NOT NULL CHECK (btrim(name) <> ''),
                    biography VARCHAR(1000)
                );
                "#,
        }]
    }
}
