use std::sync::Arc;

use catalog_db::StoreError;
use validator::Validate;

use super::models::{BookDraft, BookDto};
use super::repository::BookRepository;
use crate::error::{CatalogError, CatalogResult};
use crate::modules::authors::repository::AuthorRepository;
use crate::modules::categories::repository::CategoryRepository;

pub struct BookService {
    books: Arc<dyn BookRepository>,
    authors: Arc<dyn AuthorRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl BookService {
    pub fn new(
        books: Arc<dyn BookRepository>,
        authors: Arc<dyn AuthorRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            books,
            authors,
            categories,
        }
    }

    /// Every book ordered by id, carrying author and category names.
    pub async fn get_all(&self) -> CatalogResult<Vec<BookDto>> {
        let books = self.books.list().await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> CatalogResult<BookDto> {
        self.books
            .get(id)
            .await?
            .map(BookDto::from)
            .ok_or_else(|| CatalogError::not_found("book", id))
    }

    pub async fn add(&self, dto: &BookDto) -> CatalogResult<BookDto> {
        let draft = self.checked_draft(dto).await?;

        let book = self.books.insert(&draft).await.map_err(dangling_reference)?;
        tracing::info!(book_id = book.id, author_id = book.author_id, "book created");
        Ok(book.into())
    }

    pub async fn update(&self, id: i32, dto: &BookDto) -> CatalogResult<()> {
        if self.books.get(id).await?.is_none() {
            return Err(CatalogError::not_found("book", id));
        }
        let draft = self.checked_draft(dto).await?;

        self.books
            .update(id, &draft)
            .await
            .map_err(dangling_reference)?
            .ok_or_else(|| CatalogError::not_found("book", id))?;
        tracing::info!(book_id = id, "book updated");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> CatalogResult<()> {
        if !self.books.delete(id).await? {
            return Err(CatalogError::not_found("book", id));
        }
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    /// Normalize and validate `dto`, then confirm both references exist.
    async fn checked_draft(&self, dto: &BookDto) -> CatalogResult<BookDraft> {
        let draft = BookDraft::from_dto(dto);
        draft.validate()?;

        if self.authors.get(draft.author_id).await?.is_none() {
            return Err(CatalogError::InvalidReference(format!(
                "author {} does not exist",
                draft.author_id
            )));
        }
        if self.categories.get(draft.category_id).await?.is_none() {
            return Err(CatalogError::InvalidReference(format!(
                "category {} does not exist",
                draft.category_id
            )));
        }

        Ok(draft)
    }
}

fn dangling_reference(error: StoreError) -> CatalogError {
    match error {
        StoreError::ForeignKey(_) => CatalogError::InvalidReference(
            "the referenced author or category no longer exists".to_string(),
        ),
        other => other.into(),
    }
}
