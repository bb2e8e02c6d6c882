//! Durable storage of [`Book`] records.

use sqlx::SqlitePool;
use thiserror::Error;

use super::models::{Book, CreateBook, FieldError, NewBook};

#[derive(Debug, Error)]
pub enum BookStoreError {
    #[error("book {id} not found")]
    NotFound { id: String },

    #[error("invalid book: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_id(raw_id: &str) -> Option<i64> {
    let raw_id = raw_id.trim();
    if let Ok(id) = raw_id.parse::<i64>() {
        return Some(id);
    }

    let value = raw_id.parse::<f64>().ok()?;
    // i64::MAX is not exactly representable, so the upper bound is exclusive.
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

/// Owns the `book` table. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct BookStore {
    pool: SqlitePool,
}

impl BookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate `request` and persist it, returning the record with its new id.
    ///
    /// Nothing is written when validation fails.
    pub async fn create(&self, request: CreateBook) -> Result<Book, BookStoreError> {
        let new_book = request.validate().map_err(BookStoreError::Validation)?;
        self.insert(new_book).await
    }

    async fn insert(&self, new_book: NewBook) -> Result<Book, BookStoreError> {
        let book = sqlx::query_as::<_, Book>(
            "INSERT INTO book (title, author, description, price) VALUES (?, ?, ?, ?) \
             RETURNING id, title, author, description, price",
        )
        .bind(new_book.title)
        .bind(new_book.author)
        .bind(new_book.description)
        .bind(new_book.price)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(book_id = book.id, title = %book.title, "book created");
        Ok(book)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Book, BookStoreError> {
        tracing::debug!(book_id = id, "fetching book");

        sqlx::query_as::<_, Book>(
            "SELECT id, title, author, description, price FROM book WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BookStoreError::NotFound { id: id.to_string() })
    }

    /// Look up a book by an id exactly as it arrived on the wire.
    ///
    /// Whole numbers written as decimals (`"1.0"`, `"1e0"`) name the same
    /// record as their integer form. Anything else can never match a stored
    /// record, so it is reported as not found rather than as malformed.
    pub async fn get_by_raw_id(&self, raw_id: &str) -> Result<Book, BookStoreError> {
        match parse_id(raw_id) {
            Some(id) => self.get_by_id(id).await,
            None => Err(BookStoreError::NotFound {
                id: raw_id.to_string(),
            }),
        }
    }

    /// Every stored book in insertion order.
    pub async fn list_all(&self) -> Result<Vec<Book>, BookStoreError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, description, price FROM book ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = books.len(), "listed books");
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::book::migrations;
    use crate::modules::book::models::{FieldProblem, PriceInput};
    use bookshelf_kernel::settings::DatabaseSettings;
    use std::collections::HashSet;

    async fn store() -> BookStore {
        let pool = bookshelf_db::connect(&DatabaseSettings::in_memory())
            .await
            .unwrap();
        let migrations: Vec<(String, _)> = migrations()
            .into_iter()
            .map(|m| ("book".to_string(), m))
            .collect();
        bookshelf_db::run_migrations(&pool, &migrations).await.unwrap();
        BookStore::new(pool)
    }

    fn sample(n: usize) -> CreateBook {
        CreateBook::new(
            format!("Title {n}"),
            format!("Author {n}"),
            format!("Description {n}"),
            n as f64 + 0.5,
        )
    }

    #[tokio::test]
    async fn dune_scenario() {
        let store = store().await;

        let created = store
            .create(CreateBook::new("Dune", "Herbert", "Sci-fi epic", 9.99))
            .await
            .unwrap();

        assert_eq!(
            created,
            Book {
                id: 1,
                title: "Dune".to_string(),
                author: "Herbert".to_string(),
                description: "Sci-fi epic".to_string(),
                price: 9.99,
            }
        );
        assert_eq!(store.get_by_id(1).await.unwrap(), created);
        assert_eq!(store.list_all().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn create_then_get_returns_equal_record() {
        let store = store().await;

        for n in 0..5 {
            let created = store.create(sample(n)).await.unwrap();
            assert_eq!(store.get_by_id(created.id).await.unwrap(), created);
        }
    }

    #[tokio::test]
    async fn list_returns_each_created_record_once() {
        let store = store().await;
        let mut created = Vec::new();
        for n in 0..8 {
            created.push(store.create(sample(n)).await.unwrap());
        }

        let listed = store.list_all().await.unwrap();

        assert_eq!(listed.len(), created.len());
        for book in &created {
            assert_eq!(listed.iter().filter(|b| *b == book).count(), 1);
        }
    }

    #[tokio::test]
    async fn assigned_ids_are_pairwise_distinct() {
        let store = store().await;
        let mut ids = HashSet::new();
        for n in 0..10 {
            let book = store.create(sample(n)).await.unwrap();
            assert!(ids.insert(book.id), "id {} assigned twice", book.id);
        }
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = store().await;
        store.create(sample(1)).await.unwrap();

        assert!(matches!(
            store.get_by_id(42).await,
            Err(BookStoreError::NotFound { id }) if id == "42"
        ));
    }

    #[tokio::test]
    async fn non_integer_raw_id_is_not_found() {
        let store = store().await;
        store.create(sample(1)).await.unwrap();

        assert_eq!(store.get_by_raw_id(" 1 ").await.unwrap().id, 1);
        assert!(matches!(
            store.get_by_raw_id("abc").await,
            Err(BookStoreError::NotFound { id }) if id == "abc"
        ));
    }

    #[tokio::test]
    async fn whole_number_decimal_id_matches_integer_id() {
        let store = store().await;
        store.create(sample(1)).await.unwrap();

        assert_eq!(store.get_by_raw_id("1.0").await.unwrap().id, 1);
        assert_eq!(store.get_by_raw_id("1e0").await.unwrap().id, 1);
        assert!(matches!(
            store.get_by_raw_id("1.5").await,
            Err(BookStoreError::NotFound { id }) if id == "1.5"
        ));
        assert!(matches!(
            store.get_by_raw_id("NaN").await,
            Err(BookStoreError::NotFound { .. })
        ));
    }

    #[test]
    fn parse_id_rejects_out_of_range_values() {
        assert_eq!(parse_id("-7"), Some(-7));
        assert_eq!(parse_id("1e30"), None);
        assert_eq!(parse_id("inf"), None);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = store().await;
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn omitted_price_is_rejected_and_nothing_is_written() {
        let store = store().await;
        let mut request = sample(1);
        request.price = None;

        match store.create(request).await {
            Err(BookStoreError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "price");
                assert_eq!(errors[0].error, FieldProblem::Required);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn string_price_is_stored_as_number() {
        let store = store().await;
        let mut request = sample(1);
        request.price = Some(PriceInput::Text("4.25".to_string()));

        assert_eq!(store.create(request).await.unwrap().price, 4.25);
    }

    #[tokio::test]
    async fn table_refuses_partial_records() {
        let store = store().await;

        let result = sqlx::query(
            "INSERT INTO book (title, author, description, price) VALUES ('', 'a', 'd', 1.0)",
        )
        .execute(&store.pool)
        .await;

        assert!(result.is_err());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn closed_pool_surfaces_storage_error() {
        let store = store().await;
        store.pool.close().await;

        assert!(matches!(
            store.list_all().await,
            Err(BookStoreError::Storage(_))
        ));
    }
}
