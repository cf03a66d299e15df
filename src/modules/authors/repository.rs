use async_trait::async_trait;
use catalog_db::{map_sqlx_error, StoreError};
use sqlx::PgPool;

use super::models::{Author, AuthorDraft};

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Author>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Author>, StoreError>;

    async fn insert(&self, draft: &AuthorDraft) -> Result<Author, StoreError>;

    /// Replace the writable fields; `None` when no row has `id`.
    async fn update(&self, id: i32, draft: &AuthorDraft) -> Result<Option<Author>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;
}

pub struct PgAuthorRepository {
    pool: PgPool,
}

impl PgAuthorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorRepository for PgAuthorRepository {
    async fn list(&self) -> Result<Vec<Author>, StoreError> {
        sqlx::query_as::<_, Author>("SELECT id, name, biography FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get(&self, id: i32) -> Result<Option<Author>, StoreError> {
        sqlx::query_as::<_, Author>("SELECT id, name, biography FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert(&self, draft: &AuthorDraft) -> Result<Author, StoreError> {
        sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, biography)
            VALUES ($1, $2)
            RETURNING id, name, biography
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.biography)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update(&self, id: i32, draft: &AuthorDraft) -> Result<Option<Author>, StoreError> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors SET name = $2, biography = $3
            WHERE id = $1
            RETURNING id, name, biography
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.biography)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
