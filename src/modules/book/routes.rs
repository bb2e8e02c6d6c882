//! HTTP handlers for the book module.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use bookshelf_http::error::AppError;

use super::models::{Book, CreateBook};
use super::store::{BookStore, BookStoreError};

pub fn router(store: BookStore) -> Router {
    Router::new()
        .route("/get", get(list_books))
        .route("/add", post(add_book).get(get_add_as_id))
        .route("/health", get(health_check))
        .route("/{id}", get(get_book))
        .with_state(store)
}

impl From<BookStoreError> for AppError {
    fn from(err: BookStoreError) -> Self {
        match err {
            BookStoreError::NotFound { ref id } => {
                AppError::not_found(format!("no book with id '{}'", id))
            }
            BookStoreError::Validation(ref errors) => {
                let details = errors
                    .iter()
                    .filter_map(|e| serde_json::to_value(e).ok())
                    .collect();
                AppError::validation(details, err.to_string())
            }
            BookStoreError::Storage(source) => {
                AppError::Internal(anyhow::Error::new(source).context("book storage failed"))
            }
        }
    }
}

async fn health_check() -> &'static str {
    "book module is healthy"
}

/// GET /book/get
async fn list_books(State(store): State<BookStore>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(store.list_all().await?))
}

/// GET /book/{id}
async fn get_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(store.get_by_raw_id(&id).await?))
}

/// GET /book/add: the segment is treated as an id, like any other.
async fn get_add_as_id(State(store): State<BookStore>) -> Result<Json<Book>, AppError> {
    Ok(Json(store.get_by_raw_id("add").await?))
}

/// POST /book/add
async fn add_book(
    State(store): State<BookStore>,
    payload: Result<Json<CreateBook>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Json(request) = payload?;
    Ok(Json(store.create(request).await?))
}
