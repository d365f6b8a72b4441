//! HTTP handlers for the catalog pages

pub mod authors;
pub mod books;
pub mod catalog;
pub mod health;

use axum::{routing::get, Router};
use serde::Deserialize;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// `?q=` on the search endpoints; absent is the same as empty
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Path ids that are not UUIDs cannot name a record
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

pub(crate) fn require_id(raw: &str, entity: &str) -> AppResult<Uuid> {
    parse_id(raw).ok_or_else(|| AppError::NotFound(format!("{} not found", entity)))
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(catalog::root))
        .route("/static/search.js", get(catalog::search_script))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Landing page
        .route("/catalog", get(catalog::index))
        .route("/catalog/", get(catalog::index))
        // Books
        .route("/catalog/books", get(books::book_list))
        .route("/catalog/books/search", get(books::book_search))
        .route("/catalog/books/search2", get(books::book_search2))
        .route(
            "/catalog/book/create",
            get(books::book_create_get).post(books::book_create_post),
        )
        .route(
            "/catalog/book/:id/delete",
            get(books::book_delete_get).post(books::book_delete_post),
        )
        .route(
            "/catalog/book/:id/update",
            get(books::book_update_get).post(books::book_update_post),
        )
        .route("/catalog/book/:id", get(books::book_detail))
        // Authors
        .route("/catalog/authors", get(authors::author_list))
        .route("/catalog/authors/search", get(authors::author_search))
        .route("/catalog/authors/search2", get(authors::author_search2))
        .route(
            "/catalog/author/create",
            get(authors::author_create_get).post(authors::author_create_post),
        )
        .route(
            "/catalog/author/:id/delete",
            get(authors::author_delete_get).post(authors::author_delete_post),
        )
        .route(
            "/catalog/author/:id/update",
            get(authors::author_update_get).post(authors::author_update_post),
        )
        .route("/catalog/author/:id", get(authors::author_detail))
        .fallback(catalog::not_found)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
