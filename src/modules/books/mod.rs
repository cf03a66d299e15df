pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use catalog_kernel::{Migration, Module};

use self::models::BookDto;
use self::service::BookService;
use super::{crud_paths, schema_json};

/// Books reference authors and categories; register after both.
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(service: Arc<BookService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": crud_paths("Books", "Book", "BookDto", false),
            "components": {
                "schemas": { "BookDto": schema_json::<BookDto>() }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id          SERIAL PRIMARY KEY,
                    title       VARCHAR(300)   NOT NULL CHECK (btrim(title) <> ''),
                    price       NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
                    author_id   INTEGER        NOT NULL REFERENCES authors (id) ON DELETE RESTRICT,
                    category_id INTEGER        NOT NULL REFERENCES categories (id) ON DELETE RESTRICT
                );
                CREATE INDEX IF NOT EXISTS books_author_id_idx ON books (author_id);
                CREATE INDEX IF NOT EXISTS books_category_id_idx ON books (category_id);
                "#,
        }]
    }
}
