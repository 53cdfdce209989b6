pub mod error;
pub mod models;
pub mod query;
pub mod routes;
pub mod service;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use catalog_db::DocumentStore;
use catalog_kernel::{InitCtx, Module};
use serde_json::json;

pub use error::CatalogError;
pub use service::CatalogService;

/// Books module: the catalog service exposed over HTTP
pub struct BooksModule {
    service: Arc<CatalogService>,
}

impl BooksModule {
    pub fn new(service: CatalogService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            collection = %ctx.settings.database.collection,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn query_param(name: &str, description: &str, required: bool) -> serde_json::Value {
    json!({
        "name": name,
        "in": "query",
        "required": required,
        "description": description,
        "schema": { "type": "string" }
    })
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn error_response(description: &str) -> serde_json::Value {
    json_response(description, json!({ "$ref": "#/components/schemas/ErrorResponse" }))
}

fn book_ref() -> serde_json::Value {
    json!({ "$ref": "#/components/schemas/Book" })
}

fn openapi_fragment() -> serde_json::Value {
    let id = query_param("id", "Book identifier", true);
    let book_input = json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookInput" }
            }
        }
    });
    let book_fields = json!({
        "book_name": { "type": "string", "minLength": 1 },
        "author_name": { "type": "string", "minLength": 1 },
        "year_of_publication": { "type": "string" },
        "price": { "type": "number", "exclusiveMinimum": 0 },
        "discount": { "type": "string" },
        "number_of_pages": { "type": "integer", "minimum": 1 },
        "condition": { "type": "string", "enum": ["new", "used"], "default": "new" },
        "description": {
            "type": "string",
            "default": models::DEFAULT_DESCRIPTION
        }
    });

    let mut book_schema = json!({
        "type": "object",
        "properties": book_fields.clone(),
        "required": ["_id", "book_name", "author_name", "condition", "description"]
    });
    book_schema["properties"]["_id"] = json!({ "type": "string" });

    json!({
        "paths": {
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            },
            "/find": {
                "get": {
                    "summary": "Find a book by identifier",
                    "tags": ["Books"],
                    "parameters": [id.clone()],
                    "responses": {
                        "200": json_response("The book", book_ref()),
                        "400": error_response("Missing identifier"),
                        "404": error_response("No such book")
                    }
                }
            },
            "/allBooks": {
                "get": {
                    "summary": "List books one page at a time",
                    "tags": ["Books"],
                    "parameters": [
                        query_param("page", "1-based page number, defaults to 1", false),
                        query_param("limit", "Page size, defaults to 10", false)
                    ],
                    "responses": {
                        "200": json_response("A page of books", json!({ "$ref": "#/components/schemas/BookPage" })),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/filter": {
                "get": {
                    "summary": "Filter and sort books",
                    "tags": ["Books"],
                    "parameters": [
                        query_param("author_name", "Exact author match", false),
                        query_param("year_of_publication", "Exact year match", false),
                        query_param("price", "Maximum price", false),
                        query_param("condition", "new or used", false),
                        query_param("sort", "field:direction, direction desc or asc", false)
                    ],
                    "responses": {
                        "200": json_response("Matching books", json!({ "type": "array", "items": book_ref() })),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/add": {
                "post": {
                    "summary": "Add a book",
                    "tags": ["Books"],
                    "requestBody": book_input.clone(),
                    "responses": {
                        "200": json_response("The stored book", book_ref()),
                        "422": error_response("Validation error")
                    }
                }
            },
            "/update": {
                "put": {
                    "summary": "Update supplied fields of a book",
                    "tags": ["Books"],
                    "parameters": [id.clone()],
                    "requestBody": book_input,
                    "responses": {
                        "200": json_response("The updated book", book_ref()),
                        "404": error_response("No such book"),
                        "422": error_response("Validation error")
                    }
                }
            },
            "/delete": {
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id],
                    "responses": {
                        "200": json_response("Deletion confirmation", json!({
                            "type": "object",
                            "properties": {
                                "message": { "type": "string" },
                                "id": { "type": "string" }
                            }
                        })),
                        "404": error_response("No such book")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": book_schema,
                "BookInput": {
                    "type": "object",
                    "properties": book_fields
                },
                "BookPage": {
                    "type": "object",
                    "properties": {
                        "totalBooks": { "type": "integer" },
                        "totalPages": { "type": "integer" },
                        "currentPage": { "type": "integer" },
                        "data": { "type": "array", "items": book_ref() }
                    },
                    "required": ["totalBooks", "totalPages", "currentPage", "data"]
                }
            }
        }
    })
}

/// Create the books module over `store`
pub fn create_module(store: Arc<dyn DocumentStore>, collection: &str) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(CatalogService::new(store, collection)))
}
