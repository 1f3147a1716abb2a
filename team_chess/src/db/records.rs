//! Typed access to the document store.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;

use super::errors::StoreResult;
use super::repository::{DocumentStore, Query};
use crate::tournament::{BoardResult, Pairing, Player, Round, Team};

/// A type stored as a document in a fixed collection
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Collection name in the store
    const COLLECTION: &'static str;

    /// Document id
    fn id(&self) -> &str;
}

impl Record for Team {
    const COLLECTION: &'static str = "teams";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Player {
    const COLLECTION: &'static str = "players";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Round {
    const COLLECTION: &'static str = "rounds";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Pairing {
    const COLLECTION: &'static str = "pairings";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for BoardResult {
    const COLLECTION: &'static str = "board_results";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Typed facade over a shared [`DocumentStore`]
#[derive(Clone)]
pub struct Records {
    store: Arc<dyn DocumentStore>,
}

impl Records {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// List records matching `query`
    pub async fn list<T: Record>(&self, query: &Query) -> StoreResult<Vec<T>> {
        self.store
            .list(T::COLLECTION, query)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(Into::into))
            .collect()
    }

    /// List every record of a type
    pub async fn all<T: Record>(&self) -> StoreResult<Vec<T>> {
        self.list(&Query::all()).await
    }

    /// Fetch a record by id
    pub async fn get<T: Record>(&self, id: &str) -> StoreResult<Option<T>> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Insert a new record
    pub async fn insert<T: Record>(&self, record: &T) -> StoreResult<T> {
        let doc = serde_json::to_value(record)?;
        let stored = self.store.insert(T::COLLECTION, doc).await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Merge fields into a stored record and return the result
    pub async fn patch<T: Record>(&self, id: &str, fields: Value) -> StoreResult<T> {
        let stored = self.store.patch(T::COLLECTION, id, fields).await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Overwrite a stored record
    pub async fn replace<T: Record>(&self, record: &T) -> StoreResult<T> {
        let doc = serde_json::to_value(record)?;
        let stored = self.store.replace(T::COLLECTION, record.id(), doc).await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Delete a record by id, returning whether it existed
    pub async fn delete<T: Record>(&self, id: &str) -> StoreResult<bool> {
        self.store.delete(T::COLLECTION, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_typed_round_trip() {
        let records = Records::new(Arc::new(MemoryStore::new()));
        let team = Team::new("t1", "Rooks", "ROO").with_seed(2);

        records.insert(&team).await.unwrap();
        let loaded: Team = records.get("t1").await.unwrap().unwrap();
        assert_eq!(loaded, team);

        let renamed: Team = records.patch("t1", json!({"name": "Rooks II"})).await.unwrap();
        assert_eq!(renamed.name, "Rooks II");
        assert_eq!(renamed.seed, Some(2));

        assert!(records.delete::<Team>("t1").await.unwrap());
        assert!(records.all::<Team>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_document_is_serialization_error() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert("players", json!({"id": "p1", "full_name": "No team"}))
            .await
            .unwrap();

        let records = Records::new(store);
        let err = records.all::<Player>().await.unwrap_err();
        assert!(matches!(err, crate::db::StoreError::Serialization(_)));
    }
}
