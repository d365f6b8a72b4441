//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::author::{Author, AuthorView};
use crate::validation::{escape_html, FieldError, FormCheck};

pub const UNKNOWN_AUTHOR_MSG: &str = "Author must reference an existing author.";

/// Book as stored; `author_id` references an [`Author`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub summary: String,
    pub isbn: String,
}

impl Book {
    pub fn from_new(data: NewBook) -> Self {
        Self::with_id(Uuid::new_v4(), data)
    }

    pub fn with_id(id: Uuid, data: NewBook) -> Self {
        Self {
            id,
            title: data.title,
            author_id: data.author_id,
            summary: data.summary,
            isbn: data.isbn,
        }
    }

    pub fn url(&self) -> String {
        book_url(self.id)
    }
}

pub fn book_url(id: Uuid) -> String {
    format!("/catalog/book/{}", id)
}

/// Book with its author reference resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookWithAuthor {
    pub book: Book,
    pub author: Author,
}

impl BookWithAuthor {
    pub fn view(&self) -> BookView {
        BookView {
            id: self.book.id.to_string(),
            url: self.book.url(),
            title: self.book.title.clone(),
            summary: self.book.summary.clone(),
            isbn: self.book.isbn.clone(),
            author: self.author.view(),
        }
    }
}

/// Title and summary of a book, as listed on its author's pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
}

impl BookSummary {
    pub fn view(&self) -> BookSummaryView {
        BookSummaryView {
            url: book_url(self.id),
            title: self.title.clone(),
            summary: self.summary.clone(),
        }
    }
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            summary: book.summary.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    pub id: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: AuthorView,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookSummaryView {
    pub url: String,
    pub title: String,
    pub summary: String,
}

/// Validated book fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author_id: Uuid,
    pub summary: String,
    pub isbn: String,
}

/// Book form as submitted; `author` carries the selected author id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub isbn: String,
}

impl BookForm {
    /// Apply the book rules. Whether the author id resolves to a stored
    /// author is left to the caller.
    pub fn check(self) -> (BookForm, Result<NewBook, Vec<FieldError>>) {
        let mut check = FormCheck::new();

        let title = check.required_text("title", &self.title, None, "Title must not be empty.");
        let author = check.required_text("author", &self.author, None, "Author must not be empty.");
        let author_id = if author.is_empty() {
            None
        } else {
            let parsed = Uuid::parse_str(&author).ok();
            if parsed.is_none() {
                check.push("author", UNKNOWN_AUTHOR_MSG);
            }
            parsed
        };
        let summary =
            check.required_text("summary", &self.summary, None, "Summary must not be empty.");
        let isbn = check.required_text("isbn", &self.isbn, None, "ISBN must not be empty");

        let form = BookForm {
            title: escape_html(&title),
            author: escape_html(&author),
            summary: escape_html(&summary),
            isbn: escape_html(&isbn),
        };

        match author_id {
            Some(author_id) if check.is_empty() => {
                let data = NewBook {
                    title: form.title.clone(),
                    author_id,
                    summary: form.summary.clone(),
                    isbn: form.isbn.clone(),
                };
                (form, Ok(data))
            }
            _ => (form, Err(check.into_errors())),
        }
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author_id.to_string(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
        }
    }
}
