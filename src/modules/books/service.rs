//! Catalog use-cases over an injected document store.
//!
//! Every operation is one independent unit of work against the store; the
//! paged listing issues its slice and count queries concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use catalog_db::{DocumentStore, Filter, FindOptions};
use serde_json::Value;

use super::error::CatalogError;
use super::models::{to_document, Book, BookPage};
use super::query::{build_filter, parse_sort, Pagination};
use super::validation::{validate_new_book, validate_patch};

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Book catalog service.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Validate `input` and insert it. Invalid input never reaches the store.
    pub async fn create(&self, input: &Value) -> CatalogResult<Book> {
        let new_book = validate_new_book(input).inspect_err(|err| {
            tracing::warn!(violations = err.violations().len(), "rejected book payload");
        })?;

        let stored = self
            .store
            .insert(&self.collection, to_document(&new_book)?)
            .await?;
        let book = Book::from_document(stored)?;

        tracing::info!(book_id = %book.id, book_name = %book.book_name, "book created");
        Ok(book)
    }

    pub async fn find_by_id(&self, id: &str) -> CatalogResult<Book> {
        tracing::debug!(book_id = id, "looking up book");

        let document = self
            .store
            .find_by_id(&self.collection, id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        Ok(Book::from_document(document)?)
    }

    /// One page of the catalog in natural order, plus totals.
    pub async fn list_paged(&self, pagination: Pagination) -> CatalogResult<BookPage> {
        let everything = Filter::new();
        let options = FindOptions::page(pagination.skip(), pagination.limit());

        let (documents, total_books) = tokio::try_join!(
            self.store.find(&self.collection, &everything, &options),
            self.store.count(&self.collection, &everything),
        )?;

        let data = documents
            .into_iter()
            .map(Book::from_document)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            page = pagination.page(),
            limit = pagination.limit(),
            returned = data.len(),
            total_books,
            "listed book page"
        );

        Ok(BookPage {
            total_books,
            total_pages: pagination.total_pages(total_books),
            current_page: pagination.page(),
            data,
        })
    }

    /// All books matching the filter parameters, ordered by the `sort` parameter.
    pub async fn list_filtered(&self, params: &HashMap<String, String>) -> CatalogResult<Vec<Book>> {
        let filter = build_filter(params);
        let sort = parse_sort(params.get("sort").map(String::as_str));

        tracing::debug!(clauses = filter.clauses().len(), sort = ?sort, "filtering books");

        let documents = self
            .store
            .find(&self.collection, &filter, &FindOptions::sorted(sort))
            .await?;

        Ok(documents
            .into_iter()
            .map(Book::from_document)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Apply the supplied fields of `input` to book `id`; other fields keep their values.
    pub async fn update(&self, id: &str, input: &Value) -> CatalogResult<Book> {
        let patch = validate_patch(input).inspect_err(|err| {
            tracing::warn!(book_id = id, violations = err.violations().len(), "rejected book update");
        })?;

        let updated = self
            .store
            .update_by_id(&self.collection, id, to_document(&patch)?)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        let book = Book::from_document(updated)?;

        tracing::info!(book_id = id, "book updated");
        Ok(book)
    }

    /// Remove book `id`, returning the removed record.
    pub async fn delete(&self, id: &str) -> CatalogResult<Book> {
        let removed = self
            .store
            .delete_by_id(&self.collection, id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        let book = Book::from_document(removed)?;

        tracing::info!(book_id = id, "book deleted");
        Ok(book)
    }
}
