pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use catalog_kernel::{Migration, Module};

use self::models::CategoryDto;
use self::service::CategoryService;
use super::{crud_paths, schema_json};

pub struct CategoriesModule {
    service: Arc<CategoryService>,
}

impl CategoriesModule {
    pub fn new(service: Arc<CategoryService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for CategoriesModule {
    fn name(&self) -> &'static str {
        "categories"
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": crud_paths("Categories", "Category", "CategoryDto", true),
            "components": {
                "schemas": { "CategoryDto": schema_json::<CategoryDto>() }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_categories",
            up: r#"
                CREATE TABLE IF NOT EXISTS categories (
                    id   SERIAL PRIMARY KEY,
                    name VARCHAR(100) NOT NULL CHECK (btrim(name) <> '')
                );
                "#,
        }]
    }
}
