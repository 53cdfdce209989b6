//! The storage contract and the endpoint-based connection factory.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryStore;
use crate::query::{Filter, FindOptions};

/// A stored document: a JSON object keyed by field name.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Field holding the store-assigned identifier of every document.
pub const ID_FIELD: &str = "_id";

/// Contract every document-storage backend implements.
///
/// Each call is one independent unit of work; there are no cross-call
/// transactions and concurrent writes to the same document are last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `document`, assigning a fresh [`ID_FIELD`]. Returns the stored document.
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<Document>;

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Documents matching `filter`, ordered, skipped and limited per `options`.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>>;

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Overwrite the top-level fields present in `fields`, leaving the rest
    /// untouched. Returns the document as it is after the update.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> StoreResult<Option<Document>>;

    /// Remove a document, returning it if it existed.
    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Flush and release the store. Further calls fail with [`StoreError::Closed`].
    async fn close(&self) -> StoreResult<()>;
}

/// Open a store for `endpoint`.
///
/// `memory://` yields a volatile store, `file://<path>` a store persisted as a
/// JSON snapshot at `<path>`.
pub async fn connect(endpoint: &str) -> StoreResult<Arc<dyn DocumentStore>> {
    if endpoint == "memory://" {
        tracing::info!(target: "catalog-db", endpoint, "opening volatile document store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    if let Some(path) = endpoint.strip_prefix("file://") {
        if path.is_empty() {
            return Err(StoreError::UnsupportedEndpoint(endpoint.to_string()));
        }
        tracing::info!(target: "catalog-db", path, "opening file-backed document store");
        let store = MemoryStore::open(PathBuf::from(path)).await?;
        return Ok(Arc::new(store));
    }

    Err(StoreError::UnsupportedEndpoint(endpoint.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_endpoint_connects() {
        let store = connect("memory://").await.unwrap();
        assert_eq!(store.count("books", &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_scheme_is_rejected() {
        let err = connect("mongodb://localhost:27017").await.err().unwrap();
        assert!(matches!(err, StoreError::UnsupportedEndpoint(_)));
    }

    #[tokio::test]
    async fn empty_file_path_is_rejected() {
        let err = connect("file://").await.err().unwrap();
        assert!(matches!(err, StoreError::UnsupportedEndpoint(_)));
    }
}
