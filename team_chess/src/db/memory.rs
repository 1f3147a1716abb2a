//! In-process document store, optionally backed by a JSON data file.
//!
//! The file layout is the json-server `db.json` format: one top-level key per
//! collection, each holding an array of documents.
//!
//! ```json
//! { "teams": [{ "id": "t1", "name": "Rooks" }], "players": [] }
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::repository::{DocumentStore, Query, document_id, patch_fields, sort_documents};

type Collections = BTreeMap<String, Vec<Value>>;

/// Document store held in memory
///
/// When opened from a file, every successful write rewrites the file before
/// returning, so a crash never loses an acknowledged write.
pub struct MemoryStore {
    collections: RwLock<Collections>,
    path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store that lives only in memory
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(Collections::new()),
            path: None,
        }
    }

    /// Open a store persisted at `path`
    ///
    /// A missing file starts an empty store; the file is created on the first
    /// write.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be read and
    /// `StoreError::Serialization` if it is not a JSON object of arrays.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let collections = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Collections::new(),
            Ok(bytes) => serde_json::from_slice::<Collections>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Data file {} not found, starting empty", path.display());
                Collections::new()
            }
            Err(e) => return Err(e.into()),
        };

        log::debug!(
            "Loaded {} collections from {}",
            collections.len(),
            path.display()
        );

        Ok(Self {
            collections: RwLock::new(collections),
            path: Some(path),
        })
    }

    async fn flush(&self, collections: &Collections) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(collections)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

fn position(docs: &[Value], id: &str) -> Option<usize> {
    docs.iter()
        .position(|d| d.get("id").and_then(Value::as_str) == Some(id))
}

fn find_mut<'a>(docs: &'a mut [Value], id: &str) -> Option<&'a mut Value> {
    docs.iter_mut()
        .find(|d| d.get("id").and_then(Value::as_str) == Some(id))
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, collection: &str, query: &Query) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Value> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| query.matches(d)).cloned().collect())
            .unwrap_or_default();

        if let Some(field) = query.sort_field() {
            sort_documents(&mut docs, field);
        }
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| position(docs, id).map(|i| docs[i].clone())))
    }

    async fn insert(&self, collection: &str, doc: Value) -> StoreResult<Value> {
        let id = document_id(collection, &doc)?.to_string();

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if position(docs, &id).is_some() {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id,
            });
        }
        docs.push(doc.clone());

        self.flush(&collections).await?;
        Ok(doc)
    }

    async fn patch(&self, collection: &str, id: &str, fields: Value) -> StoreResult<Value> {
        let fields = patch_fields(collection, fields)?;

        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| find_mut(docs, id))
            .ok_or_else(|| not_found(collection, id))?;

        if let Value::Object(body) = doc {
            body.extend(fields);
        }
        let updated = doc.clone();

        self.flush(&collections).await?;
        Ok(updated)
    }

    async fn replace(&self, collection: &str, id: &str, mut doc: Value) -> StoreResult<Value> {
        if let Value::Object(map) = &mut doc {
            map.insert("id".to_string(), Value::String(id.to_string()));
        }

        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(collection)
            .and_then(|docs| find_mut(docs, id))
            .ok_or_else(|| not_found(collection, id))?;
        *slot = doc.clone();

        self.flush(&collections).await?;
        Ok(doc)
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        let removed = match collections.get_mut(collection) {
            Some(docs) => match position(docs, id) {
                Some(i) => {
                    docs.remove(i);
                    true
                }
                None => false,
            },
            None => false,
        };

        if removed {
            self.flush(&collections).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_duplicate() {
        let store = MemoryStore::new();
        store.insert("teams", json!({"id": "t1", "name": "Rooks"})).await.unwrap();

        let err = store
            .insert("teams", json!({"id": "t1", "name": "Again"}))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.list("teams", &Query::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_patch_merges_top_level_fields() {
        let store = MemoryStore::new();
        store
            .insert("pairings", json!({"id": "p1", "team_a_points": 0, "is_bye": false}))
            .await
            .unwrap();

        let updated = store
            .patch("pairings", "p1", json!({"team_a_points": 2.5, "id": "hijack"}))
            .await
            .unwrap();
        assert_eq!(updated["id"], "p1");
        assert_eq!(updated["team_a_points"], 2.5);
        assert_eq!(updated["is_bye"], false);
    }

    #[tokio::test]
    async fn test_missing_documents() {
        let store = MemoryStore::new();
        assert!(store.get("teams", "nope").await.unwrap().is_none());
        assert!(!store.delete("teams", "nope").await.unwrap());
        assert!(
            store
                .patch("teams", "nope", json!({"name": "x"}))
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(
            store
                .replace("teams", "nope", json!({"name": "x"}))
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_list_filter_and_sort() {
        let store = MemoryStore::new();
        for (id, team, desk) in [("a", "t1", 3), ("b", "t2", 1), ("c", "t1", 1)] {
            store
                .insert(
                    "players",
                    json!({"id": id, "team_id": team, "desk_number": desk}),
                )
                .await
                .unwrap();
        }

        let query = Query::all().filter("team_id", "t1").sort_by("desk_number");
        let docs = store.list("players", &query).await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_file_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        {
            let store = MemoryStore::open(&path).await.unwrap();
            store.insert("rounds", json!({"id": "r1", "round_number": 1})).await.unwrap();
            store.insert("rounds", json!({"id": "r2", "round_number": 2})).await.unwrap();
            store.delete("rounds", "r1").await.unwrap();
        }

        let reopened = MemoryStore::open(&path).await.unwrap();
        let rounds = reopened.list("rounds", &Query::all()).await.unwrap();
        assert_eq!(rounds, vec![json!({"id": "r2", "round_number": 2})]);

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(raw["rounds"].is_array());
    }

    #[tokio::test]
    async fn test_open_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = MemoryStore::open(&path).await.err().unwrap();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
