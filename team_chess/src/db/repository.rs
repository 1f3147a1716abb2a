//! Document store trait and the PostgreSQL implementation.
//!
//! Every record lives in a named collection as a JSON object with a string
//! `id` field. The store only knows about documents; typed access goes through
//! [`Records`](super::Records).

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row, types::Json};
use std::cmp::Ordering;

use super::errors::{StoreError, StoreResult};

/// Equality filters and an optional sort field for a list call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<(String, Value)>,
    sort_by: Option<String>,
}

impl Query {
    /// Match every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an equality filter on a top-level field
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Sort results ascending by a top-level field
    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_by = Some(field.into());
        self
    }

    /// Field the results are sorted by, if any
    pub fn sort_field(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    /// Whether a document satisfies every filter
    ///
    /// A `null` filter also matches a document that lacks the field.
    pub fn matches(&self, doc: &Value) -> bool {
        self.filters.iter().all(|(field, expected)| match doc.get(field) {
            Some(actual) => values_equal(actual, expected),
            None => expected.is_null(),
        })
    }

    /// Non-null filters as a JSON object, used for containment queries
    fn containment(&self) -> Value {
        let map: Map<String, Value> = self
            .filters
            .iter()
            .filter(|(_, value)| !value.is_null())
            .cloned()
            .collect();
        Value::Object(map)
    }
}

/// Collection-oriented storage used by every manager
///
/// Writes are not transactional. Callers that need several writes to land
/// together verify them afterwards.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List documents matching `query`, in insertion order unless sorted
    async fn list(&self, collection: &str, query: &Query) -> StoreResult<Vec<Value>>;

    /// Fetch one document by id
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Insert a new document; fails with `Duplicate` if the id is taken
    async fn insert(&self, collection: &str, doc: Value) -> StoreResult<Value>;

    /// Merge top-level fields into an existing document
    async fn patch(&self, collection: &str, id: &str, fields: Value) -> StoreResult<Value>;

    /// Overwrite an existing document
    async fn replace(&self, collection: &str, id: &str, doc: Value) -> StoreResult<Value>;

    /// Delete a document, returning whether it existed
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;
}

/// Read the string id of a document
pub fn document_id<'a>(collection: &str, doc: &'a Value) -> StoreResult<&'a str> {
    doc.get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::MissingId {
            collection: collection.to_string(),
        })
}

/// Strip `id` out of a patch body so a patch can never rename a document
pub(crate) fn patch_fields(collection: &str, fields: Value) -> StoreResult<Map<String, Value>> {
    match fields {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(StoreError::Serialization(serde::de::Error::custom(format!(
            "patch for '{collection}' must be a JSON object, got {other}"
        )))),
    }
}

/// Stable ascending sort of documents by a top-level field
///
/// Numbers compare numerically, strings lexically; documents missing the
/// field sort last.
pub fn sort_documents(docs: &mut [Value], field: &str) {
    docs.sort_by(|a, b| compare_fields(a.get(field), b.get(field)));
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), Some(_)) => Ordering::Greater,
        (Some(_), None | Some(Value::Null)) => Ordering::Less,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Compare two JSON values, treating `2` and `2.0` as equal
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// PostgreSQL implementation of `DocumentStore`
///
/// All collections share the `documents` table created by
/// [`Database::ensure_schema`](super::Database::ensure_schema). Filters are
/// answered with JSONB containment; `seq` preserves insertion order.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn list(&self, collection: &str, query: &Query) -> StoreResult<Vec<Value>> {
        let rows = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 AND body @> $2 ORDER BY seq",
        )
        .bind(collection)
        .bind(Json(query.containment()))
        .fetch_all(&self.pool)
        .await?;

        let mut docs = rows
            .into_iter()
            .map(|row| row.try_get::<Json<Value>, _>("body").map(|body| body.0))
            .collect::<Result<Vec<_>, _>>()?;

        // Null filters are left out of the containment query
        docs.retain(|doc| query.matches(doc));

        if let Some(field) = query.sort_field() {
            sort_documents(&mut docs, field);
        }
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .map(|r| r.try_get::<Json<Value>, _>("body"))
            .transpose()?
            .map(|body| body.0))
    }

    async fn insert(&self, collection: &str, doc: Value) -> StoreResult<Value> {
        let id = document_id(collection, &doc)?.to_string();

        let row = sqlx::query(
            "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)
             ON CONFLICT (collection, id) DO NOTHING
             RETURNING body",
        )
        .bind(collection)
        .bind(&id)
        .bind(Json(&doc))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(r.try_get::<Json<Value>, _>("body")?.0),
            None => Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id,
            }),
        }
    }

    async fn patch(&self, collection: &str, id: &str, fields: Value) -> StoreResult<Value> {
        let fields = patch_fields(collection, fields)?;

        let row = sqlx::query(
            "UPDATE documents SET body = body || $3
             WHERE collection = $1 AND id = $2
             RETURNING body",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(fields)))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(r.try_get::<Json<Value>, _>("body")?.0),
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
        }
    }

    async fn replace(&self, collection: &str, id: &str, mut doc: Value) -> StoreResult<Value> {
        if let Value::Object(map) = &mut doc {
            map.insert("id".to_string(), Value::String(id.to_string()));
        }

        let row = sqlx::query(
            "UPDATE documents SET body = $3
             WHERE collection = $1 AND id = $2
             RETURNING body",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&doc))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(r.try_get::<Json<Value>, _>("body")?.0),
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_matches_filters() {
        let doc = json!({"id": "b1", "pairing_id": "p1", "desk_number": 2});
        assert!(Query::all().matches(&doc));
        assert!(Query::all().filter("pairing_id", "p1").matches(&doc));
        assert!(
            Query::all()
                .filter("pairing_id", "p1")
                .filter("desk_number", 2.0)
                .matches(&doc)
        );
        assert!(!Query::all().filter("desk_number", 3).matches(&doc));
        assert!(Query::all().filter("result", Value::Null).matches(&doc));
    }

    #[test]
    fn test_sort_documents_numbers_and_missing() {
        let mut docs = vec![
            json!({"id": "c", "round_number": 10}),
            json!({"id": "x"}),
            json!({"id": "a", "round_number": 2}),
            json!({"id": "b", "round_number": 2}),
        ];
        sort_documents(&mut docs, "round_number");
        let ids: Vec<_> = docs.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "x"]);
    }

    #[test]
    fn test_patch_fields_drops_id() {
        let map = patch_fields("teams", json!({"id": "other", "name": "Rooks"})).unwrap();
        assert!(!map.contains_key("id"));
        assert_eq!(map["name"], "Rooks");
        assert!(patch_fields("teams", json!([1, 2])).is_err());
    }

    #[test]
    fn test_document_id_required() {
        assert_eq!(document_id("teams", &json!({"id": "t1"})).unwrap(), "t1");
        assert!(matches!(
            document_id("teams", &json!({"id": 7})),
            Err(StoreError::MissingId { .. })
        ));
    }
}
