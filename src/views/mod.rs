//! HTML rendering
//!
//! Templates are compiled into the binary and loaded on first use. Names
//! ending in `.html` are auto-escaped; text that was escaped on its way into
//! the store is marked `|safe` in the templates so it is not escaped twice.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::AppResult;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("author_list.html", include_str!("../../templates/author_list.html")),
    ("author_list_change.html", include_str!("../../templates/author_list_change.html")),
    ("author_detail.html", include_str!("../../templates/author_detail.html")),
    ("author_form.html", include_str!("../../templates/author_form.html")),
    ("author_delete.html", include_str!("../../templates/author_delete.html")),
    ("book_list.html", include_str!("../../templates/book_list.html")),
    ("book_list_change.html", include_str!("../../templates/book_list_change.html")),
    ("book_detail.html", include_str!("../../templates/book_detail.html")),
    ("book_form.html", include_str!("../../templates/book_form.html")),
    ("book_delete.html", include_str!("../../templates/book_delete.html")),
];

/// Client script driving the live search boxes
pub const SEARCH_JS: &str = include_str!("../../static/search.js");

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_loader(|name| {
        Ok(TEMPLATES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, source)| source.to_string()))
    });
    env
});

/// Render a view by template name
pub fn render<S: Serialize>(name: &str, ctx: S) -> AppResult<Html<String>> {
    let html = ENV.get_template(name)?.render(ctx)?;
    Ok(Html(html))
}

/// Generic error presenter; falls back to plain text if the template fails
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let rendered = ENV.get_template("error.html").and_then(|t| {
        t.render(context! {
            title => "Error",
            message => message,
            status => status.as_u16(),
        })
    });
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {:#}", e);
            (status, message.to_string()).into_response()
        }
    }
}

pub fn search_script() -> Response {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        SEARCH_JS,
    )
        .into_response()
}
