//! Landing page and site-wide routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Redirect, Response},
};
use minijinja::context;

use crate::{error::AppResult, views, AppState};

pub async fn root() -> Redirect {
    Redirect::to("/catalog")
}

/// Site home page with record counts
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let counts = state.services.books.counts().await?;
    let site_title = &state.config.catalog.site_title;
    views::render(
        "index.html",
        context! {
            title => site_title,
            site_title => site_title,
            book_count => counts.books,
            author_count => counts.authors,
        },
    )
}

pub async fn search_script() -> Response {
    views::search_script()
}

pub async fn not_found() -> Response {
    views::error_page(StatusCode::NOT_FOUND, "Not Found")
}
