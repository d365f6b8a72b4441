//! Books repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use super::{classify_write_error, contains_pattern, BookStore};
use crate::{
    error::AppResult,
    models::{Author, Book, BookSummary, BookWithAuthor, NewBook},
};

/// Book joined with its author; author columns are prefixed to avoid clashes
const SELECT_WITH_AUTHOR: &str = r#"
    SELECT b.id, b.title, b.author_id, b.summary, b.isbn,
           a.first_name AS author_first_name,
           a.family_name AS author_family_name,
           a.date_of_birth AS author_date_of_birth,
           a.date_of_death AS author_date_of_death
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

#[derive(FromRow)]
struct BookAuthorRow {
    id: Uuid,
    title: String,
    author_id: Uuid,
    summary: String,
    isbn: String,
    author_first_name: String,
    author_family_name: String,
    author_date_of_birth: Option<NaiveDate>,
    author_date_of_death: Option<NaiveDate>,
}

impl From<BookAuthorRow> for BookWithAuthor {
    fn from(row: BookAuthorRow) -> Self {
        Self {
            author: Author {
                id: row.author_id,
                first_name: row.author_first_name,
                family_name: row.author_family_name,
                date_of_birth: row.author_date_of_birth,
                date_of_death: row.author_date_of_death,
            },
            book: Book {
                id: row.id,
                title: row.title,
                author_id: row.author_id,
                summary: row.summary,
                isbn: row.isbn,
            },
        }
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self) -> AppResult<Vec<BookWithAuthor>> {
        let query = format!("{} ORDER BY b.title", SELECT_WITH_AUTHOR);
        let rows = sqlx::query_as::<_, BookAuthorRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(BookWithAuthor::from).collect())
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<BookWithAuthor>> {
        let query = format!("{} WHERE b.id = $1", SELECT_WITH_AUTHOR);
        let row = sqlx::query_as::<_, BookAuthorRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(BookWithAuthor::from))
    }

    async fn by_author(&self, author_id: Uuid) -> AppResult<Vec<BookSummary>> {
        let rows = sqlx::query_as::<_, BookSummary>(
            "SELECT id, title, summary FROM books WHERE author_id = $1 ORDER BY title",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn search(&self, needle: &str) -> AppResult<Vec<BookWithAuthor>> {
        let query = format!("{} WHERE b.title ILIKE $1 ORDER BY b.title", SELECT_WITH_AUTHOR);
        let rows = sqlx::query_as::<_, BookAuthorRow>(&query)
            .bind(contains_pattern(needle))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(BookWithAuthor::from).collect())
    }

    async fn create(&self, data: &NewBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (id, title, author_id, summary, isbn)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, || format!("Author {} does not exist", data.author_id)))
    }

    async fn update(&self, id: Uuid, data: &NewBook) -> AppResult<Option<Book>> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, author_id = $3, summary = $4, isbn = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, || format!("Author {} does not exist", data.author_id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
