//! Process-local store implementing every repository trait.
//!
//! Enforces the same constraints as the Postgres schema: foreign keys with
//! `RESTRICT` on delete and case-insensitive unique emails.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use catalog_authz::Role;
use catalog_db::StoreError;
use tokio::sync::RwLock;

use crate::modules::auth::models::{NewUser, UserRecord};
use crate::modules::auth::repository::UserRepository;
use crate::modules::authors::models::{Author, AuthorDraft};
use crate::modules::authors::repository::AuthorRepository;
use crate::modules::books::models::{BookDraft, BookRecord};
use crate::modules::books::repository::BookRepository;
use crate::modules::categories::models::{Category, CategoryDraft};
use crate::modules::categories::repository::CategoryRepository;

#[derive(Debug, Clone)]
struct BookRow {
    title: String,
    price: rust_decimal::Decimal,
    author_id: i32,
    category_id: i32,
}

#[derive(Default)]
struct Tables {
    authors: BTreeMap<i32, Author>,
    categories: BTreeMap<i32, Category>,
    books: BTreeMap<i32, BookRow>,
    users: BTreeMap<String, UserRecord>,
    roles: Vec<Role>,
    last_author_id: i32,
    last_category_id: i32,
    last_book_id: i32,
}

impl Tables {
    fn book_record(&self, id: i32, row: &BookRow) -> Option<BookRecord> {
        let author = self.authors.get(&row.author_id)?;
        let category = self.categories.get(&row.category_id)?;
        Some(BookRecord {
            id,
            title: row.title.clone(),
            price: row.price,
            author_id: row.author_id,
            category_id: row.category_id,
            author_name: author.name.clone(),
            category_name: category.name.clone(),
        })
    }

    fn check_book_references(&self, draft: &BookDraft) -> Result<(), StoreError> {
        if !self.authors.contains_key(&draft.author_id) {
            return Err(StoreError::ForeignKey("books_author_id_fkey".to_string()));
        }
        if !self.categories.contains_key(&draft.category_id) {
            return Err(StoreError::ForeignKey("books_category_id_fkey".to_string()));
        }
        Ok(())
    }

    fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        let email = email.to_lowercase();
        self.users
            .values()
            .find(|user| user.email.to_lowercase() == email)
    }
}

/// Cheap to clone; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Author>, StoreError> {
        Ok(self.tables.read().await.authors.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Author>, StoreError> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn insert(&self, draft: &AuthorDraft) -> Result<Author, StoreError> {
        let mut tables = self.tables.write().await;
        tables.last_author_id += 1;
        let author = Author {
            id: tables.last_author_id,
            name: draft.name.clone(),
            biography: draft.biography.clone(),
        };
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update(&self, id: i32, draft: &AuthorDraft) -> Result<Option<Author>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.authors.get_mut(&id).map(|author| {
            author.name = draft.name.clone();
            author.biography = draft.biography.clone();
            author.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.books.values().any(|book| book.author_id == id) {
            return Err(StoreError::ForeignKey("books_author_id_fkey".to_string()));
        }
        Ok(tables.authors.remove(&id).is_some())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.tables.read().await.categories.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Category>, StoreError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn insert(&self, draft: &CategoryDraft) -> Result<Category, StoreError> {
        let mut tables = self.tables.write().await;
        tables.last_category_id += 1;
        let category = Category {
            id: tables.last_category_id,
            name: draft.name.clone(),
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: i32, draft: &CategoryDraft) -> Result<Option<Category>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.categories.get_mut(&id).map(|category| {
            category.name = draft.name.clone();
            category.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.books.values().any(|book| book.category_id == id) {
            return Err(StoreError::ForeignKey("books_category_id_fkey".to_string()));
        }
        Ok(tables.categories.remove(&id).is_some())
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<BookRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .iter()
            .filter_map(|(id, row)| tables.book_record(*id, row))
            .collect())
    }

    async fn get(&self, id: i32) -> Result<Option<BookRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .get(&id)
            .and_then(|row| tables.book_record(id, row)))
    }

    async fn insert(&self, draft: &BookDraft) -> Result<BookRecord, StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_book_references(draft)?;

        tables.last_book_id += 1;
        let id = tables.last_book_id;
        let row = BookRow {
            title: draft.title.clone(),
            price: draft.price,
            author_id: draft.author_id,
            category_id: draft.category_id,
        };
        let record = tables
            .book_record(id, &row)
            .ok_or_else(|| StoreError::Backend("book references vanished".to_string()))?;
        tables.books.insert(id, row);
        Ok(record)
    }

    async fn update(&self, id: i32, draft: &BookDraft) -> Result<Option<BookRecord>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&id) {
            return Ok(None);
        }
        tables.check_book_references(draft)?;

        let row = BookRow {
            title: draft.title.clone(),
            price: draft.price,
            author_id: draft.author_id,
            category_id: draft.category_id,
        };
        let record = tables.book_record(id, &row);
        tables.books.insert(id, row);
        Ok(record)
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.books.remove(&id).is_some())
    }

    async fn count_by_author(&self, author_id: i32) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|book| book.author_id == author_id)
            .count() as i64)
    }

    async fn count_by_category(&self, category_id: i32) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|book| book.category_id == category_id)
            .count() as i64)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.tables.read().await.user_by_email(email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<UserRecord, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.user_by_email(&user.email).is_some() {
            return Err(StoreError::Unique("users_email_lower_key".to_string()));
        }
        if let Some(role) = user.roles.iter().find(|role| !tables.roles.contains(role)) {
            return Err(StoreError::ForeignKey(format!("unknown role {role}")));
        }

        let mut roles = user.roles.clone();
        roles.sort();
        roles.dedup();
        let record = UserRecord {
            id: user.id.to_string(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            password_hash: user.password_hash.clone(),
            roles,
        };
        tables.users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn add_role(&self, user_id: &str, role: Role) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.roles.contains(&role) {
            return Err(StoreError::ForeignKey(format!("unknown role {role}")));
        }
        let user = tables
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::ForeignKey(format!("unknown user {user_id}")))?;
        if !user.roles.contains(&role) {
            user.roles.push(role);
            user.roles.sort();
        }
        Ok(())
    }

    async fn ensure_roles(&self, roles: &[Role]) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        for role in roles {
            if !tables.roles.contains(role) {
                tables.roles.push(*role);
            }
        }
        tables.roles.sort();
        Ok(())
    }

    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        Ok(self.tables.read().await.roles.clone())
    }
}
