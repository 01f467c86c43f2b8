//! SQLite persistence for books and their reviews.
//!
//! # Invariants
//! - Every review row references an existing book (`FOREIGN KEY ... ON DELETE
//!   CASCADE`, enforced because connections run with `foreign_keys=ON`).
//! - `created_at` is stored as integer microseconds since the Unix epoch so
//!   ordering by it is chronological.

use folio_db::Database;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use time::OffsetDateTime;

use super::error::{BooksError, BooksResult};
use super::models::{Book, BookId, NewBook, NewReview, Review, ReviewId};

const BOOK_SELECT_SQL: &str = "SELECT id, title, author, description FROM books";

const REVIEW_SELECT_SQL: &str =
    "SELECT id, book_id, username, rating, comment, created_at FROM reviews";

/// Schema contributed by the books module.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE books (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT    NOT NULL CHECK (length(title) > 0),
    author      TEXT    NOT NULL CHECK (length(author) > 0),
    description TEXT
);

CREATE TABLE reviews (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    book_id    INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
    username   TEXT    NOT NULL CHECK (length(username) > 0),
    rating     INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comment    TEXT    NOT NULL CHECK (length(comment) > 0),
    created_at INTEGER NOT NULL
);

CREATE INDEX books_title ON books (title);
CREATE INDEX reviews_book_created ON reviews (book_id, created_at);
"#;

/// Storage client for the books module.
///
/// Each method is one statement or one transaction on the shared connection.
#[derive(Debug, Clone)]
pub struct BookRepository {
    db: Database,
}

impl BookRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn count_books(&self) -> BooksResult<i64> {
        self.db
            .call(|conn| {
                let count = conn.query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))?;
                Ok(count)
            })
            .await
    }

    /// Insert all `books` in a single transaction.
    pub async fn insert_books(&self, books: Vec<NewBook>) -> BooksResult<Vec<Book>> {
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut inserted = Vec::with_capacity(books.len());
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO books (title, author, description) VALUES (?1, ?2, ?3);",
                    )?;
                    for book in books {
                        stmt.execute(params![book.title, book.author, book.description])?;
                        inserted.push(Book {
                            id: tx.last_insert_rowid(),
                            title: book.title,
                            author: book.author,
                            description: book.description,
                        });
                    }
                }
                tx.commit()?;
                Ok(inserted)
            })
            .await
    }

    /// Fetch one book; `NotFound` when the id does not exist.
    pub async fn get_book(&self, id: BookId) -> BooksResult<Book> {
        self.db
            .call(move |conn| {
                conn.query_row(
                    &format!("{BOOK_SELECT_SQL} WHERE id = ?1;"),
                    params![id],
                    parse_book_row,
                )
                .optional()?
                .ok_or(BooksError::NotFound(id))
            })
            .await
    }

    /// All books ordered by title.
    pub async fn list_books(&self) -> BooksResult<Vec<Book>> {
        self.db
            .call(|conn| {
                let mut stmt =
                    conn.prepare(&format!("{BOOK_SELECT_SQL} ORDER BY title ASC, id ASC;"))?;
                let books = stmt
                    .query_map([], parse_book_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(books)
            })
            .await
    }

    /// Reviews of one book, newest first. Equal timestamps fall back to
    /// insertion order, newest first.
    pub async fn list_reviews_for_book(&self, book_id: BookId) -> BooksResult<Vec<Review>> {
        self.db
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "{REVIEW_SELECT_SQL}
                     WHERE book_id = ?1
                     ORDER BY created_at DESC, id DESC;"
                ))?;
                let reviews = stmt
                    .query_map(params![book_id], parse_review_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(reviews)
            })
            .await
    }

    pub async fn count_reviews_for_book(&self, book_id: BookId) -> BooksResult<i64> {
        self.db
            .call(move |conn| {
                let count = conn.query_row(
                    "SELECT COUNT(*) FROM reviews WHERE book_id = ?1;",
                    params![book_id],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
    }

    /// Insert one review and return the stored row.
    pub async fn insert_review(&self, review: NewReview) -> BooksResult<Review> {
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO reviews (book_id, username, rating, comment, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        review.book_id,
                        review.username,
                        review.rating.get(),
                        review.comment,
                        to_micros(review.created_at),
                    ],
                )?;
                let id = conn.last_insert_rowid();
                load_review(conn, id)
            })
            .await
    }

    /// Delete a book; its reviews go with it.
    pub async fn delete_book(&self, id: BookId) -> BooksResult<()> {
        self.db
            .call(move |conn| {
                let changed = conn.execute("DELETE FROM books WHERE id = ?1;", params![id])?;
                if changed == 0 {
                    return Err(BooksError::NotFound(id));
                }
                Ok(())
            })
            .await
    }
}

fn load_review(conn: &Connection, id: ReviewId) -> BooksResult<Review> {
    let review = conn.query_row(
        &format!("{REVIEW_SELECT_SQL} WHERE id = ?1;"),
        params![id],
        parse_review_row,
    )?;
    Ok(review)
}

fn parse_book_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        description: row.get(3)?,
    })
}

fn parse_review_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        book_id: row.get(1)?,
        username: row.get(2)?,
        rating: row.get(3)?,
        comment: row.get(4)?,
        created_at: from_micros(row.get(5)?).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(5, Type::Integer, Box::new(err))
        })?,
    })
}

fn to_micros(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000) as i64
}

fn from_micros(micros: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000)
}
