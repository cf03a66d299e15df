use async_trait::async_trait;
use catalog_db::{map_sqlx_error, StoreError};
use sqlx::PgPool;

use super::models::{BookDraft, BookRecord};

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books ordered by id, with author and category names.
    async fn list(&self) -> Result<Vec<BookRecord>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<BookRecord>, StoreError>;

    /// Fails with [`StoreError::ForeignKey`] when a reference is dangling.
    async fn insert(&self, draft: &BookDraft) -> Result<BookRecord, StoreError>;

    async fn update(&self, id: i32, draft: &BookDraft) -> Result<Option<BookRecord>, StoreError>;

    async fn delete(&self, id: i32) -> Result<bool, StoreError>;

    async fn count_by_author(&self, author_id: i32) -> Result<i64, StoreError>;

    async fn count_by_category(&self, category_id: i32) -> Result<i64, StoreError>;
}

pub struct PgBookRepository {
    pool: PgPool,
}

impl PgBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_BOOKS: &str = r#"
    SELECT b.id, b.title, b.price, b.author_id, b.category_id,
           a.name AS author_name, c.name AS category_name
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN categories c ON c.id = b.category_id
"#;

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn list(&self) -> Result<Vec<BookRecord>, StoreError> {
        sqlx::query_as::<_, BookRecord>(&format!("{SELECT_BOOKS} ORDER BY b.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get(&self, id: i32) -> Result<Option<BookRecord>, StoreError> {
        sqlx::query_as::<_, BookRecord>(&format!("{SELECT_BOOKS} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert(&self, draft: &BookDraft) -> Result<BookRecord, StoreError> {
        sqlx::query_as::<_, BookRecord>(
            r#"
            WITH b AS (
                INSERT INTO books (title, price, author_id, category_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, title, price, author_id, category_id
            )
            SELECT b.id, b.title, b.price, b.author_id, b.category_id,
                   a.name AS author_name, c.name AS category_name
            FROM b
            JOIN authors a ON a.id = b.author_id
            JOIN categories c ON c.id = b.category_id
            "#,
        )
        .bind(&draft.title)
        .bind(draft.price)
        .bind(draft.author_id)
        .bind(draft.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update(&self, id: i32, draft: &BookDraft) -> Result<Option<BookRecord>, StoreError> {
        sqlx::query_as::<_, BookRecord>(
            r#"
            WITH b AS (
                UPDATE books
                SET title = $2, price = $3, author_id = $4, category_id = $5
                WHERE id = $1
                RETURNING id, title, price, author_id, category_id
            )
            SELECT b.id, b.title, b.price, b.author_id, b.category_id,
                   a.name AS author_name, c.name AS category_name
            FROM b
            JOIN authors a ON a.id = b.author_id
            JOIN categories c ON c.id = b.category_id
            "#,
        )
        .bind(id)
        .bind(&draft.title)
        .bind(draft.price)
        .bind(draft.author_id)
        .bind(draft.category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_author(&self, author_id: i32) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_by_category(&self, category_id: i32) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
