use std::sync::Arc;

use catalog_db::StoreError;
use validator::Validate;

use super::models::{CategoryDraft, CategoryDto};
use super::repository::CategoryRepository;
use crate::error::{CatalogError, CatalogResult};
use crate::modules::books::repository::BookRepository;

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    books: Arc<dyn BookRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, books: Arc<dyn BookRepository>) -> Self {
        Self { categories, books }
    }

    pub async fn get_all(&self) -> CatalogResult<Vec<CategoryDto>> {
        let categories = self.categories.list().await?;
        Ok(categories.into_iter().map(CategoryDto::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> CatalogResult<CategoryDto> {
        self.categories
            .get(id)
            .await?
            .map(CategoryDto::from)
            .ok_or_else(|| CatalogError::not_found("category", id))
    }

    pub async fn add(&self, dto: &CategoryDto) -> CatalogResult<CategoryDto> {
        let draft = CategoryDraft::from_dto(dto);
        draft.validate()?;

        let category = self.categories.insert(&draft).await?;
        tracing::info!(category_id = category.id, "category created");
        Ok(category.into())
    }

    pub async fn update(&self, id: i32, dto: &CategoryDto) -> CatalogResult<()> {
        let draft = CategoryDraft::from_dto(dto);
        draft.validate()?;

        self.categories
            .update(id, &draft)
            .await?
            .ok_or_else(|| CatalogError::not_found("category", id))?;
        tracing::info!(category_id = id, "category updated");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> CatalogResult<()> {
        if self.categories.get(id).await?.is_none() {
            return Err(CatalogError::not_found("category", id));
        }

        let books = self.books.count_by_category(id).await?;
        if books > 0 {
            return Err(referenced(id, books));
        }

        match self.categories.delete(id).await {
            Ok(true) => {
                tracing::info!(category_id = id, "category deleted");
                Ok(())
            }
            Ok(false) => Err(CatalogError::not_found("category", id)),
            Err(StoreError::ForeignKey(_)) => Err(referenced(id, 1)),
            Err(e) => Err(e.into()),
        }
    }
}

fn referenced(id: i32, books: i64) -> CatalogError {
    CatalogError::ReferentialConflict(format!(
        "category {id} is referenced by {books} book(s) and cannot be deleted"
    ))
}
