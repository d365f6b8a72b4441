//! Book pages

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;

use super::{parse_id, require_id, SearchQuery};
use crate::{
    error::AppResult,
    models::{Author, BookForm, BookView, BookWithAuthor},
    validation::{FieldError, Submission},
    views, AppState,
};

const BOOK_LIST_URL: &str = "/catalog/books";

fn book_views(books: &[BookWithAuthor]) -> Vec<BookView> {
    books.iter().map(BookWithAuthor::view).collect()
}

fn render_form(
    title: &str,
    book: &BookForm,
    authors: &[Author],
    errors: &[FieldError],
) -> AppResult<Html<String>> {
    views::render(
        "book_form.html",
        context! {
            title => title,
            book => book,
            authors => authors.iter().map(Author::view).collect::<Vec<_>>(),
            errors => errors,
        },
    )
}

/// Re-render a rejected form; the author selector needs a fresh author list
async fn render_rejected(
    state: &AppState,
    title: &str,
    form: &BookForm,
    errors: &[FieldError],
) -> AppResult<Response> {
    let authors = state.services.books.author_choices().await?;
    Ok(render_form(title, form, &authors, errors)?.into_response())
}

/// Display list of all books
pub async fn book_list(State(state): State<AppState>) -> AppResult<Html<String>> {
    let books = state.services.books.list().await?;
    views::render(
        "book_list.html",
        context! { title => "Book List", book_list => book_views(&books) },
    )
}

/// Display detail page for a specific book
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = require_id(&id, "Book")?;
    let book = state.services.books.get(id).await?;
    let view = book.view();
    views::render("book_detail.html", context! { title => view.title.clone(), book => view })
}

/// Display book create form
pub async fn book_create_get(State(state): State<AppState>) -> AppResult<Html<String>> {
    let authors = state.services.books.author_choices().await?;
    render_form("Create Book", &BookForm::default(), &authors, &[])
}

/// Handle book create
pub async fn book_create_post(
    State(state): State<AppState>,
    form: Result<Form<BookForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = form?;
    match state.services.books.create(form).await? {
        Submission::Accepted(book) => Ok(Redirect::to(&book.url()).into_response()),
        Submission::Rejected { form, errors } => {
            render_rejected(&state, "Create Book", &form, &errors).await
        }
    }
}

/// Display book delete confirmation
pub async fn book_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&id) else {
        return Ok(Redirect::to(BOOK_LIST_URL).into_response());
    };
    match state.services.books.find(id).await? {
        Some(book) => {
            let page = views::render(
                "book_delete.html",
                context! { title => "Delete Book", book => book.view() },
            )?;
            Ok(page.into_response())
        }
        None => Ok(Redirect::to(BOOK_LIST_URL).into_response()),
    }
}

/// Handle book delete
pub async fn book_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    if let Some(id) = parse_id(&id) {
        state.services.books.delete(id).await?;
    }
    Ok(Redirect::to(BOOK_LIST_URL))
}

/// Display book update form
pub async fn book_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = require_id(&id, "Book")?;
    let (book, authors) = state.services.books.get_for_edit(id).await?;
    render_form("Update Book", &BookForm::from(&book.book), &authors, &[])
}

/// Handle book update
pub async fn book_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<BookForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = form?;
    let id = require_id(&id, "Book")?;
    match state.services.books.update(id, form).await? {
        Submission::Accepted(book) => Ok(Redirect::to(&book.url()).into_response()),
        Submission::Rejected { form, errors } => {
            render_rejected(&state, "Update Book", &form, &errors).await
        }
    }
}

/// Full-page title search; an empty query shows the whole list
pub async fn book_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Response> {
    if query.q.is_empty() {
        return Ok(Redirect::to(BOOK_LIST_URL).into_response());
    }
    tracing::debug!("Book search for {:?}", query.q);
    let books = state.services.books.search(&query.q).await?;
    let page = views::render(
        "book_list.html",
        context! {
            title => "Book List",
            query => query.q,
            book_list => book_views(&books),
        },
    )?;
    Ok(page.into_response())
}

/// Title search returning only the list items, for live search
pub async fn book_search2(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let books = state.services.books.search(&query.q).await?;
    views::render("book_list_change.html", context! { book_list => book_views(&books) })
}
