//! Author pages

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;

use super::{parse_id, require_id, SearchQuery};
use crate::{
    error::AppResult,
    models::{Author, AuthorForm, AuthorView, BookSummary},
    services::authors::AuthorDeletion,
    validation::{FieldError, Submission},
    views, AppState,
};

const AUTHOR_LIST_URL: &str = "/catalog/authors";

fn author_views(authors: &[Author]) -> Vec<AuthorView> {
    authors.iter().map(Author::view).collect()
}

fn render_form(title: &str, author: &AuthorForm, errors: &[FieldError]) -> AppResult<Html<String>> {
    views::render(
        "author_form.html",
        context! { title => title, author => author, errors => errors },
    )
}

fn render_delete(author: &Author, books: &[BookSummary]) -> AppResult<Html<String>> {
    views::render(
        "author_delete.html",
        context! {
            title => "Delete Author",
            author => author.view(),
            author_books => books.iter().map(BookSummary::view).collect::<Vec<_>>(),
        },
    )
}

/// Display list of all authors
pub async fn author_list(State(state): State<AppState>) -> AppResult<Html<String>> {
    let authors = state.services.authors.list().await?;
    views::render(
        "author_list.html",
        context! { title => "Author List", author_list => author_views(&authors) },
    )
}

/// Display detail page for a specific author, with their books
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = require_id(&id, "Author")?;
    let (author, books) = state.services.authors.get_with_books(id).await?;
    views::render(
        "author_detail.html",
        context! {
            title => "Author Detail",
            author => author.view(),
            author_books => books.iter().map(BookSummary::view).collect::<Vec<_>>(),
        },
    )
}

/// Display author create form
pub async fn author_create_get() -> AppResult<Html<String>> {
    render_form("Create Author", &AuthorForm::default(), &[])
}

/// Handle author create
pub async fn author_create_post(
    State(state): State<AppState>,
    form: Result<Form<AuthorForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = form?;
    match state.services.authors.create(form).await? {
        Submission::Accepted(author) => Ok(Redirect::to(&author.url()).into_response()),
        Submission::Rejected { form, errors } => {
            Ok(render_form("Create Author", &form, &errors)?.into_response())
        }
    }
}

/// Display author delete confirmation
pub async fn author_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&id) else {
        return Ok(Redirect::to(AUTHOR_LIST_URL).into_response());
    };
    match state.services.authors.find_with_books(id).await? {
        (Some(author), books) => Ok(render_delete(&author, &books)?.into_response()),
        (None, _) => Ok(Redirect::to(AUTHOR_LIST_URL).into_response()),
    }
}

/// Handle author delete; refused while books reference the author
pub async fn author_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&id) else {
        return Ok(Redirect::to(AUTHOR_LIST_URL).into_response());
    };
    match state.services.authors.delete(id).await? {
        AuthorDeletion::HasBooks { author, books } => {
            Ok(render_delete(&author, &books)?.into_response())
        }
        AuthorDeletion::Deleted | AuthorDeletion::Missing => {
            Ok(Redirect::to(AUTHOR_LIST_URL).into_response())
        }
    }
}

/// Display author update form
pub async fn author_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = require_id(&id, "Author")?;
    let author = state.services.authors.get(id).await?;
    render_form("Update Author", &AuthorForm::from(&author), &[])
}

/// Handle author update
pub async fn author_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<AuthorForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = form?;
    let id = require_id(&id, "Author")?;
    match state.services.authors.update(id, form).await? {
        Submission::Accepted(author) => Ok(Redirect::to(&author.url()).into_response()),
        Submission::Rejected { form, errors } => {
            Ok(render_form("Update Author", &form, &errors)?.into_response())
        }
    }
}

/// Full-page author search; an empty query shows the whole list
pub async fn author_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Response> {
    if query.q.is_empty() {
        return Ok(Redirect::to(AUTHOR_LIST_URL).into_response());
    }
    let authors = state.services.authors.search(&query.q).await?;
    let page = views::render(
        "author_list.html",
        context! {
            title => "Author List",
            query => query.q,
            author_list => author_views(&authors),
        },
    )?;
    Ok(page.into_response())
}

/// Author search returning only the list items, for live search
pub async fn author_search2(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let authors = state.services.authors.search(&query.q).await?;
    views::render(
        "author_list_change.html",
        context! { author_list => author_views(&authors) },
    )
}
