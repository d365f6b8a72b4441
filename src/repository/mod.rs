//! Repository layer for catalog records
//!
//! Handlers reach the record store through [`AuthorStore`] and [`BookStore`].
//! PostgreSQL backs them in production; [`memory::MemoryStore`] serves local
//! runs and tests.

pub mod authors;
pub mod books;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, BookSummary, BookWithAuthor, NewAuthor, NewBook},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    /// All authors ordered by family name
    async fn list(&self) -> AppResult<Vec<Author>>;

    async fn find(&self, id: Uuid) -> AppResult<Option<Author>>;

    /// Case-insensitive substring match on first or family name
    async fn search(&self, needle: &str) -> AppResult<Vec<Author>>;

    async fn create(&self, data: &NewAuthor) -> AppResult<Author>;

    /// `None` when no author has this id
    async fn update(&self, id: Uuid, data: &NewAuthor) -> AppResult<Option<Author>>;

    /// `Ok(false)` when no author has this id. Fails with
    /// [`AppError::Conflict`] while books still reference the author.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    /// All books ordered by title, authors resolved
    async fn list(&self) -> AppResult<Vec<BookWithAuthor>>;

    async fn find(&self, id: Uuid) -> AppResult<Option<BookWithAuthor>>;

    async fn by_author(&self, author_id: Uuid) -> AppResult<Vec<BookSummary>>;

    /// Case-insensitive substring match on title
    async fn search(&self, needle: &str) -> AppResult<Vec<BookWithAuthor>>;

    async fn create(&self, data: &NewBook) -> AppResult<Book>;

    async fn update(&self, id: Uuid, data: &NewBook) -> AppResult<Option<Book>>;

    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Main repository struct holding the record stores
#[derive(Clone)]
pub struct Repository {
    pub authors: Arc<dyn AuthorStore>,
    pub books: Arc<dyn BookStore>,
    pool: Option<Pool<Postgres>>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: Arc::new(authors::AuthorsRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            authors: store.clone(),
            books: store,
            pool: None,
        }
    }

    /// Repository over arbitrary stores (mocks in tests)
    pub fn from_stores(authors: Arc<dyn AuthorStore>, books: Arc<dyn BookStore>) -> Self {
        Self {
            authors,
            books,
            pool: None,
        }
    }

    /// Check the database answers; always succeeds for the in-memory store
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

/// `%needle%` for ILIKE, with LIKE metacharacters taken literally
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Turn a PostgreSQL foreign key violation into a [`AppError::Conflict`]
pub(crate) fn classify_write_error(err: sqlx::Error, conflict: impl FnOnce() -> String) -> AppError {
    let is_fk_violation = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23503");
    if is_fk_violation {
        AppError::Conflict(conflict())
    } else {
        AppError::Database(err)
    }
}
