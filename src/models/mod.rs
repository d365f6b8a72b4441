//! Data models for the catalog

pub mod author;
pub mod book;

// Re-export commonly used types
pub use author::{Author, AuthorForm, AuthorView, NewAuthor};
pub use book::{Book, BookForm, BookSummary, BookView, BookWithAuthor, NewBook};
