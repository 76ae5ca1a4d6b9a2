use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Extension,
};
use bookshelf_authz::Principal;
use bookshelf_http::{response, AppError, JsonObject};

use super::models::BookResource;
use super::store::BookStore;
use super::validation::{current_year, validate};

const BOOK_NOT_FOUND: &str = "Book not found";

/// Ids that are not integers cannot name a book.
fn book_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::not_found(BOOK_NOT_FOUND))
}

/// `GET /books`: an empty catalogue is a 404.
pub async fn index(State(store): State<BookStore>) -> Result<Response, AppError> {
    let books = store.all().await?;
    if books.is_empty() {
        return Ok(response::message(StatusCode::NOT_FOUND, "No books found"));
    }

    Ok(response::ok("Books found", BookResource::collection(books)))
}

pub async fn create(
    State(store): State<BookStore>,
    Extension(principal): Extension<Principal>,
    JsonObject(body): JsonObject,
) -> Result<Response, AppError> {
    let payload = validate(&body, current_year())?;
    let book = store.create(&payload).await?;

    tracing::info!(book_id = book.id, user_id = principal.user_id, "book created");
    Ok(response::created("Book created", BookResource::from(book)))
}

pub async fn show(
    State(store): State<BookStore>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let book = store
        .find(book_id(&id)?)
        .await?
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))?;

    Ok(response::ok("Book found", BookResource::from(book)))
}

/// `PUT /books/{id}`: the payload is validated before the id is looked up.
pub async fn update(
    State(store): State<BookStore>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<Response, AppError> {
    let payload = validate(&body, current_year())?;
    let book = store
        .update(book_id(&id)?, &payload)
        .await?
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))?;

    tracing::info!(book_id = book.id, user_id = principal.user_id, "book updated");
    Ok(response::ok("Book updated", BookResource::from(book)))
}

pub async fn destroy(
    State(store): State<BookStore>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = book_id(&id)?;
    if !store.delete(id).await? {
        return Err(AppError::not_found(BOOK_NOT_FOUND));
    }

    tracing::info!(book_id = id, user_id = principal.user_id, "book deleted");
    Ok(response::message(StatusCode::OK, "Book deleted"))
}
