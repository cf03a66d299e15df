use std::sync::Arc;

use catalog_db::StoreError;
use validator::Validate;

use super::models::{AuthorDraft, AuthorDto};
use super::repository::AuthorRepository;
use crate::error::{CatalogError, CatalogResult};
use crate::modules::books::repository::BookRepository;

pub struct AuthorService {
    authors: Arc<dyn AuthorRepository>,
    books: Arc<dyn BookRepository>,
}

impl AuthorService {
    pub fn new(authors: Arc<dyn AuthorRepository>, books: Arc<dyn BookRepository>) -> Self {
        Self { authors, books }
    }

    pub async fn get_all(&self) -> CatalogResult<Vec<AuthorDto>> {
        let authors = self.authors.list().await?;
        Ok(authors.into_iter().map(AuthorDto::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> CatalogResult<AuthorDto> {
        self.authors
            .get(id)
            .await?
            .map(AuthorDto::from)
            .ok_or_else(|| CatalogError::not_found("author", id))
    }

    pub async fn add(&self, dto: &AuthorDto) -> CatalogResult<AuthorDto> {
        let draft = AuthorDraft::from_dto(dto);
        draft.validate()?;

        let author = self.authors.insert(&draft).await?;
        tracing::info!(author_id = author.id, "author created");
        Ok(author.into())
    }

    pub async fn update(&self, id: i32, dto: &AuthorDto) -> CatalogResult<()> {
        let draft = AuthorDraft::from_dto(dto);
        draft.validate()?;

        self.authors
            .update(id, &draft)
            .await?
            .ok_or_else(|| CatalogError::not_found("author", id))?;
        tracing::info!(author_id = id, "author updated");
        Ok(())
    }

    /// Delete an author that no book references.
    pub async fn delete(&self, id: i32) -> CatalogResult<()> {
        if self.authors.get(id).await?.is_none() {
            return Err(CatalogError::not_found("author", id));
        }

        let books = self.books.count_by_author(id).await?;
        if books > 0 {
            return Err(referenced(id, books));
        }

        match self.authors.delete(id).await {
            Ok(true) => {
                tracing::info!(author_id = id, "author deleted");
                Ok(())
            }
            Ok(false) => Err(CatalogError::not_found("author", id)),
            // A book was added between the check and the delete.
            Err(StoreError::ForeignKey(_)) => Err(referenced(id, 1)),
            Err(e) => Err(e.into()),
        }
    }
}

fn referenced(id: i32, books: i64) -> CatalogError {
    CatalogError::ReferentialConflict(format!(
        "author {id} is referenced by {books} book(s) and cannot be deleted"
    ))
}
