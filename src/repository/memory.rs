//! In-process record store
//!
//! Mirrors the PostgreSQL schema's rules: author deletion is refused while
//! books reference the author, and books must point at a stored author.

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthorStore, BookStore};
use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, BookSummary, BookWithAuthor, NewAuthor, NewBook},
};

#[derive(Default)]
struct Tables {
    authors: IndexMap<Uuid, Author>,
    books: IndexMap<Uuid, Book>,
}

impl Tables {
    fn resolve(&self, book: &Book) -> Option<BookWithAuthor> {
        self.authors.get(&book.author_id).map(|author| BookWithAuthor {
            book: book.clone(),
            author: author.clone(),
        })
    }

    fn resolved_sorted<'a>(&self, books: impl Iterator<Item = &'a Book>) -> Vec<BookWithAuthor> {
        let mut rows: Vec<_> = books.filter_map(|b| self.resolve(b)).collect();
        rows.sort_by(|a, b| a.book.title.cmp(&b.book.title));
        rows
    }

    fn require_author(&self, author_id: Uuid) -> AppResult<()> {
        if self.authors.contains_key(&author_id) {
            Ok(())
        } else {
            Err(AppError::Conflict(format!("Author {} does not exist", author_id)))
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn by_family_name(authors: &mut [Author]) {
    authors.sort_by(|a, b| {
        a.family_name
            .cmp(&b.family_name)
            .then_with(|| a.first_name.cmp(&b.first_name))
    });
}

#[async_trait]
impl AuthorStore for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.authors.len() as i64)
    }

    async fn list(&self) -> AppResult<Vec<Author>> {
        let mut authors: Vec<_> = self.tables.read().await.authors.values().cloned().collect();
        by_family_name(&mut authors);
        Ok(authors)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Author>> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn search(&self, needle: &str) -> AppResult<Vec<Author>> {
        let needle = needle.to_lowercase();
        let mut authors: Vec<_> = self
            .tables
            .read()
            .await
            .authors
            .values()
            .filter(|a| {
                contains_ignore_case(&a.first_name, &needle)
                    || contains_ignore_case(&a.family_name, &needle)
            })
            .cloned()
            .collect();
        by_family_name(&mut authors);
        Ok(authors)
    }

    async fn create(&self, data: &NewAuthor) -> AppResult<Author> {
        let author = Author::from_new(data.clone());
        self.tables
            .write()
            .await
            .authors
            .insert(author.id, author.clone());
        Ok(author)
    }

    async fn update(&self, id: Uuid, data: &NewAuthor) -> AppResult<Option<Author>> {
        let mut tables = self.tables.write().await;
        Ok(tables.authors.get_mut(&id).map(|slot| {
            *slot = Author::with_id(id, data.clone());
            slot.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.books.values().any(|b| b.author_id == id) {
            return Err(AppError::Conflict(format!("Author {} still has books", id)));
        }
        Ok(tables.authors.shift_remove(&id).is_some())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.books.len() as i64)
    }

    async fn list(&self) -> AppResult<Vec<BookWithAuthor>> {
        let tables = self.tables.read().await;
        Ok(tables.resolved_sorted(tables.books.values()))
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<BookWithAuthor>> {
        let tables = self.tables.read().await;
        Ok(tables.books.get(&id).and_then(|b| tables.resolve(b)))
    }

    async fn by_author(&self, author_id: Uuid) -> AppResult<Vec<BookSummary>> {
        let tables = self.tables.read().await;
        let mut books: Vec<_> = tables
            .books
            .values()
            .filter(|b| b.author_id == author_id)
            .map(BookSummary::from)
            .collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn search(&self, needle: &str) -> AppResult<Vec<BookWithAuthor>> {
        let needle = needle.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables.resolved_sorted(
            tables
                .books
                .values()
                .filter(|b| contains_ignore_case(&b.title, &needle)),
        ))
    }

    async fn create(&self, data: &NewBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        tables.require_author(data.author_id)?;
        let book = Book::from_new(data.clone());
        tables.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update(&self, id: Uuid, data: &NewBook) -> AppResult<Option<Book>> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&id) {
            return Ok(None);
        }
        tables.require_author(data.author_id)?;
        let book = Book::with_id(id, data.clone());
        tables.books.insert(id, book.clone());
        Ok(Some(book))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.write().await.books.shift_remove(&id).is_some())
    }
}
