//! HTTP handlers for the books module.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Json, Router,
};
use catalog_http::error::AppError;
use catalog_http::extract::{JsonBody, QueryParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::{Book, BookPage};
use super::query::Pagination;
use super::service::CatalogService;

type Catalog = State<Arc<CatalogService>>;

/// Routes mounted under `/api/books`.
pub fn router(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/find", get(find_book))
        .route("/allBooks", get(list_books))
        .route("/filter", get(filter_books))
        .route("/add", post(add_book))
        .route("/update", put(update_book))
        .route("/delete", delete(delete_book))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct IdParams {
    id: Option<String>,
}

impl IdParams {
    fn require(self) -> Result<String, AppError> {
        self.id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::bad_request("missing 'id' query parameter"))
    }
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
struct Deleted {
    message: &'static str,
    id: String,
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn find_book(
    State(service): Catalog,
    QueryParams(params): QueryParams<IdParams>,
) -> Result<Json<Book>, AppError> {
    let id = params.require()?;
    Ok(Json(service.find_by_id(&id).await?))
}

async fn list_books(
    State(service): Catalog,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<BookPage>, AppError> {
    let pagination = Pagination::from_params(params.page.as_deref(), params.limit.as_deref());
    Ok(Json(service.list_paged(pagination).await?))
}

async fn filter_books(
    State(service): Catalog,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.list_filtered(&params).await?))
}

async fn add_book(
    State(service): Catalog,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.create(&body).await?))
}

async fn update_book(
    State(service): Catalog,
    QueryParams(params): QueryParams<IdParams>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Book>, AppError> {
    let id = params.require()?;
    Ok(Json(service.update(&id, &body).await?))
}

async fn delete_book(
    State(service): Catalog,
    QueryParams(params): QueryParams<IdParams>,
) -> Result<Json<Deleted>, AppError> {
    let id = params.require()?;
    let removed = service.delete(&id).await?;
    Ok(Json(Deleted {
        message: "book deleted",
        id: removed.id,
    }))
}
