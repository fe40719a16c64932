//! In-process document store.
//!
//! Holds every document in one `BTreeMap` keyed by path behind a
//! [`tokio::sync::RwLock`]. Each call takes the lock once, so single
//! document writes are atomic exactly like the remote store's, and a read
//! followed by a write is not.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DocPath, DocumentStore, Fields, Snapshot, format_timestamp, parse_timestamp};
use crate::error::MeshimapError;

/// Source of "server time" for timestamp fields.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Document store kept entirely in memory.
pub struct MemoryStore {
    docs: RwLock<BTreeMap<DocPath, Fields>>,
    clock: Clock,
}

impl MemoryStore {
    /// Creates an empty store stamping documents with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Creates an empty store stamping documents with `clock`.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
            clock,
        }
    }

    /// Returns the number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Returns `true` if the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    fn stamp(&self, fields: &mut Fields, server_timestamps: &[&str]) {
        if server_timestamps.is_empty() {
            return;
        }
        let now = Value::String(format_timestamp((self.clock)()));
        for field in server_timestamps {
            fields.insert((*field).to_string(), now.clone());
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

fn in_collection(path: &DocPath, collection_path: &str) -> bool {
    path.collection_path() == collection_path
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Snapshot>, MeshimapError> {
        let docs = self.docs.read().await;
        Ok(docs.get(path).map(|fields| Snapshot {
            path: path.clone(),
            fields: fields.clone(),
        }))
    }

    async fn set(
        &self,
        path: &DocPath,
        mut fields: Fields,
        server_timestamps: &[&str],
    ) -> Result<(), MeshimapError> {
        self.stamp(&mut fields, server_timestamps);
        self.docs.write().await.insert(path.clone(), fields);
        Ok(())
    }

    async fn merge(
        &self,
        path: &DocPath,
        mut fields: Fields,
        server_timestamps: &[&str],
    ) -> Result<(), MeshimapError> {
        self.stamp(&mut fields, server_timestamps);
        let mut docs = self.docs.write().await;
        let existing = docs.entry(path.clone()).or_default();
        for (key, value) in fields {
            existing.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> Result<(), MeshimapError> {
        self.docs.write().await.remove(path);
        Ok(())
    }

    async fn list(&self, collection_path: &str) -> Result<Vec<Snapshot>, MeshimapError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .filter(|(path, _)| in_collection(path, collection_path))
            .map(|(path, fields)| Snapshot {
                path: path.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn query_eq(
        &self,
        collection_path: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Snapshot>, MeshimapError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .filter(|(path, fields)| {
                in_collection(path, collection_path) && fields.get(field) == Some(value)
            })
            .map(|(path, fields)| Snapshot {
                path: path.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn query_group_range(
        &self,
        collection_id: &str,
        field: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Snapshot>, MeshimapError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .filter(|(path, fields)| {
                path.collection_id() == collection_id
                    && fields
                        .get(field)
                        .and_then(parse_timestamp)
                        .is_some_and(|ts| ts >= start && ts <= end)
            })
            .map(|(path, fields)| Snapshot {
                path: path.clone(),
                fields: fields.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn path(segments: &[&str]) -> DocPath {
        let Ok(path) = DocPath::new(segments) else {
            panic!("invalid path {segments:?}");
        };
        path
    }

    fn fields(value: Value) -> Fields {
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        map
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        let Some(ts) = Utc.with_ymd_and_hms(y, m, d, h, min, s).single() else {
            panic!("invalid date");
        };
        ts
    }

    #[tokio::test]
    async fn set_get_delete() {
        let store = MemoryStore::new();
        let p = path(&["shops", "s1"]);

        let _ = store.set(&p, fields(json!({"name": "A"})), &[]).await;
        let Ok(Some(doc)) = store.get(&p).await else {
            panic!("document missing");
        };
        assert_eq!(doc.fields.get("name"), Some(&json!("A")));

        let _ = store.delete(&p).await;
        assert!(matches!(store.get(&p).await, Ok(None)));
        // Deleting twice is fine.
        assert!(store.delete(&p).await.is_ok());
    }

    #[tokio::test]
    async fn server_timestamp_uses_store_clock() {
        let fixed = at(2026, 10, 5, 12, 0, 0);
        let store = MemoryStore::with_clock(Arc::new(move || fixed));
        let p = path(&["users", "u1", "visited", "s1"]);

        let _ = store
            .set(
                &p,
                fields(json!({"visitedAt": "1999-01-01T00:00:00.000Z"})),
                &["visitedAt"],
            )
            .await;
        let Ok(Some(doc)) = store.get(&p).await else {
            panic!("document missing");
        };
        assert_eq!(
            doc.fields.get("visitedAt").and_then(parse_timestamp),
            Some(fixed)
        );
    }

    #[tokio::test]
    async fn merge_keeps_other_fields() {
        let store = MemoryStore::new();
        let p = path(&["users", "u1"]);
        let _ = store
            .set(&p, fields(json!({"displayName": "Aki", "email": "a@x"})), &[])
            .await;
        let _ = store
            .merge(&p, fields(json!({"email": "b@x"})), &["updatedAt"])
            .await;

        let Ok(Some(doc)) = store.get(&p).await else {
            panic!("document missing");
        };
        assert_eq!(doc.fields.get("displayName"), Some(&json!("Aki")));
        assert_eq!(doc.fields.get("email"), Some(&json!("b@x")));
        assert!(doc.fields.contains_key("updatedAt"));
    }

    #[tokio::test]
    async fn list_only_returns_direct_children() {
        let store = MemoryStore::new();
        let _ = store.set(&path(&["users", "u1"]), Fields::new(), &[]).await;
        let _ = store
            .set(&path(&["users", "u1", "bookmarks", "s1"]), Fields::new(), &[])
            .await;
        let _ = store
            .set(&path(&["users", "u1", "bookmarks", "s2"]), Fields::new(), &[])
            .await;
        let _ = store
            .set(&path(&["users", "u2", "bookmarks", "s1"]), Fields::new(), &[])
            .await;

        let Ok(docs) = store.list("users/u1/bookmarks").await else {
            panic!("list failed");
        };
        let ids: Vec<&str> = docs.iter().map(|d| d.path.id()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
    }

    #[tokio::test]
    async fn query_eq_filters_by_field() {
        let store = MemoryStore::new();
        let _ = store
            .set(&path(&["shops", "a"]), fields(json!({"genre": "ramen"})), &[])
            .await;
        let _ = store
            .set(&path(&["shops", "b"]), fields(json!({"genre": "cafe"})), &[])
            .await;

        let Ok(docs) = store.query_eq("shops", "genre", &json!("ramen")).await else {
            panic!("query failed");
        };
        assert_eq!(docs.len(), 1);
        assert_eq!(docs.first().map(|d| d.path.id()), Some("a"));
    }

    #[tokio::test]
    async fn group_range_is_inclusive_and_spans_owners() {
        let store = MemoryStore::new();
        let start = at(2026, 10, 1, 0, 0, 0);
        let end = at(2026, 10, 31, 23, 59, 59);

        let rows = [
            (&["users", "u1", "visited", "a"], start),
            (&["users", "u2", "visited", "b"], end),
            (&["users", "u2", "visited", "c"], at(2026, 9, 30, 23, 59, 59)),
            (&["users", "u3", "visited", "d"], at(2026, 11, 1, 0, 0, 0)),
        ];
        for (segments, ts) in rows {
            let _ = store
                .set(
                    &path(segments),
                    fields(json!({"visitedAt": format_timestamp(ts)})),
                    &[],
                )
                .await;
        }
        // Same field name in another collection must not match.
        let _ = store
            .set(
                &path(&["users", "u1", "bookmarks", "a"]),
                fields(json!({"visitedAt": format_timestamp(start)})),
                &[],
            )
            .await;

        let Ok(docs) = store
            .query_group_range("visited", "visitedAt", start, end)
            .await
        else {
            panic!("query failed");
        };
        let ids: Vec<&str> = docs.iter().map(|d| d.path.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
