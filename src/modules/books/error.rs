use folio_db::DbError;
use folio_http::error::AppError;
use thiserror::Error;

use super::models::BookId;
use super::validation::ValidationError;

pub type BooksResult<T> = Result<T, BooksError>;

/// Errors surfaced by the books services.
#[derive(Error, Debug)]
pub enum BooksError {
    #[error("book {0} not found")]
    NotFound(BookId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl From<rusqlite::Error> for BooksError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

impl From<BooksError> for AppError {
    fn from(err: BooksError) -> Self {
        match err {
            BooksError::NotFound(id) => AppError::not_found(format!("book {id} not found")),
            BooksError::Validation(validation) => {
                AppError::validation(validation.details(), validation.to_string())
            }
            BooksError::Storage(storage) => {
                AppError::Internal(anyhow::Error::new(storage).context("books storage failure"))
            }
        }
    }
}
