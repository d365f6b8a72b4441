//! Author pipeline: lookups, validated writes and the guarded delete

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Author, AuthorForm, BookSummary},
    repository::Repository,
    validation::{escape_html, Submission},
};

/// Result of an author delete request
#[derive(Debug)]
pub enum AuthorDeletion {
    Deleted,
    /// No author with that id; nothing to do
    Missing,
    /// Books still reference the author, so it was kept
    HasBooks {
        author: Author,
        books: Vec<BookSummary>,
    },
}

#[derive(Clone)]
pub struct AuthorService {
    repository: Repository,
}

impl AuthorService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All authors ordered by family name
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    /// Authors whose first or family name contains `query`, ignoring case
    pub async fn search(&self, query: &str) -> AppResult<Vec<Author>> {
        // stored names are escaped, so match against the escaped query
        self.repository.authors.search(&escape_html(query)).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Author> {
        self.repository
            .authors
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Author not found".to_string()))
    }

    /// Author and the books referencing it, read concurrently
    pub async fn find_with_books(&self, id: Uuid) -> AppResult<(Option<Author>, Vec<BookSummary>)> {
        tokio::try_join!(
            self.repository.authors.find(id),
            self.repository.books.by_author(id),
        )
    }

    pub async fn get_with_books(&self, id: Uuid) -> AppResult<(Author, Vec<BookSummary>)> {
        match self.find_with_books(id).await? {
            (Some(author), books) => Ok((author, books)),
            (None, _) => Err(AppError::NotFound("Author not found".to_string())),
        }
    }

    pub async fn create(&self, form: AuthorForm) -> AppResult<Submission<Author, AuthorForm>> {
        let data = match form.check() {
            (_, Ok(data)) => data,
            (form, Err(errors)) => return Ok(Submission::Rejected { form, errors }),
        };
        let author = self.repository.authors.create(&data).await?;
        tracing::info!("Created author {} ({})", author.id, author.name());
        Ok(Submission::Accepted(author))
    }

    /// Replace the author's fields, keeping its id
    pub async fn update(
        &self,
        id: Uuid,
        form: AuthorForm,
    ) -> AppResult<Submission<Author, AuthorForm>> {
        let data = match form.check() {
            (_, Ok(data)) => data,
            (form, Err(errors)) => return Ok(Submission::Rejected { form, errors }),
        };
        let author = self
            .repository
            .authors
            .update(id, &data)
            .await?
            .ok_or_else(|| AppError::NotFound("Author not found".to_string()))?;
        tracing::info!("Updated author {}", author.id);
        Ok(Submission::Accepted(author))
    }

    /// Delete the author unless books still reference it
    pub async fn delete(&self, id: Uuid) -> AppResult<AuthorDeletion> {
        let (author, books) = match self.find_with_books(id).await? {
            (None, _) => return Ok(AuthorDeletion::Missing),
            (Some(author), books) => (author, books),
        };

        if !books.is_empty() {
            tracing::info!("Refused to delete author {}: {} book(s) reference it", id, books.len());
            return Ok(AuthorDeletion::HasBooks { author, books });
        }

        match self.repository.authors.delete(id).await {
            Ok(true) => {
                tracing::info!("Deleted author {}", id);
                Ok(AuthorDeletion::Deleted)
            }
            Ok(false) => Ok(AuthorDeletion::Missing),
            // a book was added since the check above
            Err(AppError::Conflict(msg)) => {
                tracing::info!("Refused to delete author {}: {}", id, msg);
                let books = self.repository.books.by_author(id).await?;
                Ok(AuthorDeletion::HasBooks { author, books })
            }
            Err(e) => Err(e),
        }
    }
}
