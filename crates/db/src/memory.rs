//! In-process document store, optionally persisted as a JSON snapshot.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, FindOptions};
use crate::store::{Document, DocumentStore, ID_FIELD};

type Collections = HashMap<String, Vec<Document>>;

#[derive(Debug, Default)]
struct State {
    collections: Collections,
    closed: bool,
}

impl State {
    fn open(&self) -> StoreResult<&Collections> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(&self.collections)
    }

    fn open_mut(&mut self) -> StoreResult<&mut Collections> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(&mut self.collections)
    }
}

/// Document store held in memory.
///
/// Insertion order is the natural order of every collection. When built with
/// [`MemoryStore::open`], the contents are loaded from a snapshot file and
/// every mutation rewrites that file before it returns.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// Volatile store; contents are lost on close.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store persisted at `path`. A missing file starts an empty store.
    pub async fn open(path: PathBuf) -> StoreResult<Self> {
        let collections = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Collections::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Collections::new(),
            Err(err) => return Err(err.into()),
        };

        tracing::debug!(
            target: "catalog-db",
            path = %path.display(),
            collections = collections.len(),
            "snapshot loaded"
        );

        Ok(Self {
            state: RwLock::new(State {
                collections,
                closed: false,
            }),
            snapshot: Some(path),
        })
    }

    async fn persist(&self, collections: &Collections) -> StoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(collections)?;
        let staging = path.with_extension("tmp");
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, path).await?;

        tracing::debug!(target: "catalog-db", path = %path.display(), "snapshot written");
        Ok(())
    }

    /// Apply `mutate` under the write lock.
    ///
    /// With a snapshot file the change is staged on a copy and only becomes
    /// visible once the snapshot has been written, so an acknowledged write
    /// survives a crash and a failed write leaves the store unchanged.
    async fn commit<T>(&self, mutate: impl FnOnce(&mut Collections) -> T) -> StoreResult<T> {
        let mut state = self.state.write().await;
        let collections = state.open_mut()?;

        if self.snapshot.is_none() {
            return Ok(mutate(collections));
        }

        let mut staged = collections.clone();
        let outcome = mutate(&mut staged);
        self.persist(&staged).await?;
        *collections = staged;
        Ok(outcome)
    }
}

fn id_of(document: &Document) -> Option<&str> {
    document.get(ID_FIELD).and_then(|value| value.as_str())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, mut document: Document) -> StoreResult<Document> {
        let id = Uuid::now_v7().to_string();
        document.insert(ID_FIELD.to_string(), id.into());

        self.commit(|collections| {
            collections
                .entry(collection.to_string())
                .or_default()
                .push(document.clone());
        })
        .await?;

        Ok(document)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let state = self.state.read().await;
        let found = state
            .open()?
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| id_of(doc) == Some(id)))
            .cloned();
        Ok(found)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let state = self.state.read().await;
        let mut matched: Vec<Document> = state
            .open()?
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default();
        drop(state);

        if let Some(sort) = &options.sort {
            matched.sort_by(|left, right| sort.compare(left, right));
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let state = self.state.read().await;
        let count = state
            .open()?
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        mut fields: Document,
    ) -> StoreResult<Option<Document>> {
        fields.remove(ID_FIELD);

        self.commit(|collections| {
            let document = collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|doc| id_of(doc) == Some(id)))?;
            document.extend(fields);
            Some(document.clone())
        })
        .await
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.commit(|collections| {
            let docs = collections.get_mut(collection)?;
            docs.iter()
                .position(|doc| id_of(doc) == Some(id))
                .map(|index| docs.remove(index))
        })
        .await
    }

    async fn close(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.closed {
            return Ok(());
        }

        self.persist(&state.collections).await?;
        state.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Direction, SortSpec};
    use serde_json::{json, Value};

    const BOOKS: &str = "books";

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    async fn seeded(prices: &[f64]) -> (MemoryStore, Vec<String>) {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for price in prices {
            let stored = store.insert(BOOKS, doc(json!({ "price": price }))).await.unwrap();
            ids.push(id_of(&stored).unwrap().to_string());
        }
        (store, ids)
    }

    #[tokio::test]
    async fn insert_assigns_fresh_identifier() {
        let store = MemoryStore::new();
        let stored = store
            .insert(BOOKS, doc(json!({ "_id": "forged", "book_name": "A" })))
            .await
            .unwrap();

        let id = id_of(&stored).unwrap();
        assert_ne!(id, "forged");
        assert_eq!(store.find_by_id(BOOKS, id).await.unwrap(), Some(stored.clone()));
        assert!(store.find_by_id(BOOKS, "forged").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_applies_skip_and_limit_in_natural_order() {
        let (store, ids) = seeded(&[1.0, 2.0, 3.0, 4.0, 5.0]).await;

        let page = store
            .find(BOOKS, &Filter::new(), &FindOptions::page(2, 2))
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(id_of(&page[0]), Some(ids[2].as_str()));
        assert_eq!(id_of(&page[1]), Some(ids[3].as_str()));
    }

    #[tokio::test]
    async fn find_sorts_descending() {
        let (store, _) = seeded(&[3.0, 1.0, 2.0]).await;

        let sorted = store
            .find(
                BOOKS,
                &Filter::new(),
                &FindOptions::sorted(Some(SortSpec::new("price", Direction::Descending))),
            )
            .await
            .unwrap();

        let prices: Vec<f64> = sorted.iter().map(|d| d["price"].as_f64().unwrap()).collect();
        assert_eq!(prices, vec![3.0, 2.0, 1.0]);
    }

    #[tokio::test]
    async fn count_honours_filter() {
        let (store, _) = seeded(&[5.0, 15.0, 25.0]).await;
        let filter = Filter::new().with_lte("price", 15.0);
        assert_eq!(store.count(BOOKS, &filter).await.unwrap(), 2);
        assert_eq!(store.count("missing", &filter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_merges_supplied_fields_only() {
        let store = MemoryStore::new();
        let stored = store
            .insert(BOOKS, doc(json!({ "book_name": "A", "price": 1.0 })))
            .await
            .unwrap();
        let id = id_of(&stored).unwrap().to_string();

        let updated = store
            .update_by_id(BOOKS, &id, doc(json!({ "price": 9.99, "_id": "other" })))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated["book_name"], json!("A"));
        assert_eq!(updated["price"], json!(9.99));
        assert_eq!(id_of(&updated), Some(id.as_str()));
        assert!(store
            .update_by_id(BOOKS, "nope", Document::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_removes_once() {
        let (store, ids) = seeded(&[1.0, 2.0]).await;

        assert!(store.delete_by_id(BOOKS, &ids[0]).await.unwrap().is_some());
        assert!(store.delete_by_id(BOOKS, &ids[0]).await.unwrap().is_none());
        assert_eq!(store.count(BOOKS, &Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn closed_store_rejects_operations() {
        let store = MemoryStore::new();
        store.close().await.unwrap();

        let err = store.count(BOOKS, &Filter::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Closed));
        let err = store.insert(BOOKS, Document::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Closed));
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let path = std::env::temp_dir().join(format!("catalog-db-{}.json", Uuid::now_v7()));

        let store = MemoryStore::open(path.clone()).await.unwrap();
        let stored = store
            .insert(BOOKS, doc(json!({ "book_name": "Persisted" })))
            .await
            .unwrap();
        store.close().await.unwrap();

        let reopened = MemoryStore::open(path.clone()).await.unwrap();
        let found = reopened
            .find_by_id(BOOKS, id_of(&stored).unwrap())
            .await
            .unwrap();
        assert_eq!(found, Some(stored));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn acknowledged_writes_survive_without_close() {
        let path = std::env::temp_dir().join(format!("catalog-db-{}.json", Uuid::now_v7()));

        let store = MemoryStore::open(path.clone()).await.unwrap();
        let kept = store
            .insert(BOOKS, doc(json!({ "book_name": "Kept", "price": 1.0 })))
            .await
            .unwrap();
        let gone = store
            .insert(BOOKS, doc(json!({ "book_name": "Gone" })))
            .await
            .unwrap();
        let kept_id = id_of(&kept).unwrap().to_string();
        let gone_id = id_of(&gone).unwrap().to_string();
        store
            .update_by_id(BOOKS, &kept_id, doc(json!({ "price": 4.5 })))
            .await
            .unwrap();
        store.delete_by_id(BOOKS, &gone_id).await.unwrap();
        drop(store);

        let reopened = MemoryStore::open(path.clone()).await.unwrap();
        let found = reopened.find_by_id(BOOKS, &kept_id).await.unwrap().unwrap();
        assert_eq!(found["price"], json!(4.5));
        assert!(reopened.find_by_id(BOOKS, &gone_id).await.unwrap().is_none());
        assert_eq!(reopened.count(BOOKS, &Filter::new()).await.unwrap(), 1);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn failed_snapshot_write_leaves_store_unchanged() {
        let dir = std::env::temp_dir().join(format!("catalog-db-{}", Uuid::now_v7()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        // The snapshot path is a directory, so the rename onto it fails.
        let path = dir.join("snapshot.json");
        tokio::fs::create_dir_all(&path).await.unwrap();

        let store = MemoryStore {
            state: RwLock::new(State::default()),
            snapshot: Some(path),
        };
        let err = store.insert(BOOKS, Document::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.count(BOOKS, &Filter::new()).await.unwrap(), 0);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
