//! Book pipeline and the catalog landing counts

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{book::UNKNOWN_AUTHOR_MSG, Author, Book, BookForm, BookWithAuthor},
    repository::Repository,
    validation::{escape_html, FieldError, Submission},
};

/// Record totals shown on the landing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCounts {
    pub books: i64,
    pub authors: i64,
}

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        let (books, authors) = tokio::try_join!(
            self.repository.books.count(),
            self.repository.authors.count(),
        )?;
        Ok(CatalogCounts { books, authors })
    }

    /// All books ordered by title
    pub async fn list(&self) -> AppResult<Vec<BookWithAuthor>> {
        self.repository.books.list().await
    }

    /// Books whose title contains `query`, ignoring case
    pub async fn search(&self, query: &str) -> AppResult<Vec<BookWithAuthor>> {
        self.repository.books.search(&escape_html(query)).await
    }

    pub async fn find(&self, id: Uuid) -> AppResult<Option<BookWithAuthor>> {
        self.repository.books.find(id).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<BookWithAuthor> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Authors offered by the book form's author selector
    pub async fn author_choices(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    /// Book to edit and the author choices, read concurrently
    pub async fn get_for_edit(&self, id: Uuid) -> AppResult<(BookWithAuthor, Vec<Author>)> {
        let (book, authors) = tokio::try_join!(self.find(id), self.author_choices())?;
        let book = book.ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        Ok((book, authors))
    }

    pub async fn create(&self, form: BookForm) -> AppResult<Submission<Book, BookForm>> {
        let (form, result) = form.check();
        let data = match result {
            Ok(data) => data,
            Err(errors) => return Ok(Submission::Rejected { form, errors }),
        };
        if self.repository.authors.find(data.author_id).await?.is_none() {
            return Ok(unknown_author(form));
        }
        match self.repository.books.create(&data).await {
            Ok(book) => {
                tracing::info!("Created book {} ({})", book.id, book.title);
                Ok(Submission::Accepted(book))
            }
            // author deleted since the lookup above
            Err(AppError::Conflict(_)) => Ok(unknown_author(form)),
            Err(e) => Err(e),
        }
    }

    /// Replace the book's fields, keeping its id
    pub async fn update(&self, id: Uuid, form: BookForm) -> AppResult<Submission<Book, BookForm>> {
        let (form, result) = form.check();
        let data = match result {
            Ok(data) => data,
            Err(errors) => return Ok(Submission::Rejected { form, errors }),
        };
        if self.repository.authors.find(data.author_id).await?.is_none() {
            return Ok(unknown_author(form));
        }
        match self.repository.books.update(id, &data).await {
            Ok(Some(book)) => {
                tracing::info!("Updated book {}", book.id);
                Ok(Submission::Accepted(book))
            }
            Ok(None) => Err(AppError::NotFound("Book not found".to_string())),
            Err(AppError::Conflict(_)) => Ok(unknown_author(form)),
            Err(e) => Err(e),
        }
    }

    /// Books have no dependents, so deletion is unconditional
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let deleted = self.repository.books.delete(id).await?;
        if deleted {
            tracing::info!("Deleted book {}", id);
        }
        Ok(deleted)
    }
}

fn unknown_author(form: BookForm) -> Submission<Book, BookForm> {
    Submission::Rejected {
        form,
        errors: vec![FieldError {
            field: "author",
            msg: UNKNOWN_AUTHOR_MSG.to_string(),
        }],
    }
}
