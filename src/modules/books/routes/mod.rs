//! HTTP handlers for the books module, mounted under `/api/books`.

use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use folio_http::error::AppError;
use folio_http::router::module_path;
use serde::Serialize;

use super::error::BooksError;
use super::flash::{Flash, FlashMessage};
use super::models::{Book, BookId, Review, ReviewForm};
use super::service::{BookQueryService, ReviewService};
use super::MODULE_NAME;

/// Services shared by the books handlers.
#[derive(Debug, Clone)]
pub struct BooksState {
    pub queries: BookQueryService,
    pub reviews: ReviewService,
}

/// Book detail document.
#[derive(Debug, Serialize)]
pub struct BookDetailView {
    pub book: Book,
    pub reviews: Vec<Review>,
    pub flash: Option<FlashMessage>,
}

/// Body sent along with the redirect after a submission.
#[derive(Debug, Serialize)]
pub struct RedirectView {
    pub redirect: String,
    pub flash: FlashMessage,
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(list_books))
        .route("/health", get(health_check))
        .route("/{book_id}", get(book_detail))
        .route("/{book_id}/reviews", post(submit_review))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(state): State<BooksState>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.queries.list_books().await?))
}

async fn book_detail(
    State(state): State<BooksState>,
    book_id: Result<Path<BookId>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let book_id = book_id_or_not_found(book_id)?;
    let detail = state.queries.book_detail(book_id).await?;
    let flash = Flash::from_headers(&headers);

    let body = Json(BookDetailView {
        book: detail.book,
        reviews: detail.reviews,
        flash: flash.map(Flash::to_message),
    });

    // A flash is shown once.
    Ok(match flash {
        Some(_) => ([(header::SET_COOKIE, Flash::clear_cookie())], body).into_response(),
        None => body.into_response(),
    })
}

async fn submit_review(
    State(state): State<BooksState>,
    book_id: Result<Path<BookId>, PathRejection>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Response, AppError> {
    let book_id = book_id_or_not_found(book_id)?;
    // An unreadable body counts as an empty form; the book lookup still runs first.
    let form = match form {
        Ok(Form(pairs)) => ReviewForm::from_pairs(pairs),
        Err(rejection) => {
            tracing::debug!(book_id, error = %rejection, "unreadable review form");
            ReviewForm::default()
        }
    };
    let flash = match state.reviews.submit_review(book_id, &form).await {
        Ok(_) => Flash::ReviewAdded,
        Err(BooksError::Validation(err)) => {
            tracing::info!(book_id, reason = %err, "review rejected");
            Flash::from(&err)
        }
        Err(err) => return Err(err.into()),
    };

    Ok(redirect_to_book(book_id, flash))
}

/// Ids that are not integers name no book.
fn book_id_or_not_found(path: Result<Path<BookId>, PathRejection>) -> Result<BookId, AppError> {
    path.map(|Path(book_id)| book_id).map_err(|rejection| {
        tracing::debug!(error = %rejection, "unparseable book id");
        AppError::not_found("book not found")
    })
}

/// 303 back to the detail view with the flash cookie set.
fn redirect_to_book(book_id: BookId, flash: Flash) -> Response {
    let location = format!("{}/{}", module_path(MODULE_NAME), book_id);

    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, location.clone()),
            (header::SET_COOKIE, flash.set_cookie()),
        ],
        Json(RedirectView {
            redirect: location,
            flash: flash.to_message(),
        }),
    )
        .into_response()
}
