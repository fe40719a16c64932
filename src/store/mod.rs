//! Document store client.
//!
//! The service keeps all of its data in a hierarchical document store:
//! documents live at slash-separated paths that alternate collection and
//! document IDs (`users/{uid}/visited/{shopId}`). [`DocumentStore`] is the
//! seam every service talks through; [`MemoryStore`] backs tests and local
//! runs and [`PostgresStore`] persists documents as JSONB rows.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::error::MeshimapError;

/// Field map of a single document.
pub type Fields = Map<String, Value>;

/// Validated path of a document.
///
/// Always has an even, non-zero number of non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(String);

impl DocPath {
    /// Builds a document path from alternating collection / document IDs.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::InvalidRequest`] if the segment count is odd
    /// or zero, or if any segment is blank or contains `/`.
    pub fn new(segments: &[&str]) -> Result<Self, MeshimapError> {
        if segments.is_empty() || segments.len() % 2 != 0 {
            return Err(MeshimapError::InvalidRequest(format!(
                "document path needs an even number of segments, got {}",
                segments.len()
            )));
        }
        if let Some(bad) = segments
            .iter()
            .find(|s| s.trim().is_empty() || s.contains('/'))
        {
            return Err(MeshimapError::InvalidRequest(format!(
                "invalid document path segment: {bad:?}"
            )));
        }
        Ok(Self(segments.join("/")))
    }

    /// Parses a stored path string.
    ///
    /// # Errors
    ///
    /// Same as [`DocPath::new`].
    pub fn parse(path: &str) -> Result<Self, MeshimapError> {
        let segments: Vec<&str> = path.split('/').collect();
        Self::new(&segments)
    }

    /// Returns the full path string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the document ID (last segment).
    #[must_use]
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Returns the path of the collection containing this document.
    #[must_use]
    pub fn collection_path(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(parent, _)| parent)
    }

    /// Returns the ID of the collection containing this document, which is
    /// what collection-group queries match on.
    #[must_use]
    pub fn collection_id(&self) -> &str {
        self.collection_path().rsplit('/').next().unwrap_or_default()
    }

    /// Returns the document owning this document's collection, if any.
    ///
    /// For `users/u1/visited/s1` this is `users/u1`.
    #[must_use]
    pub fn parent_document(&self) -> Option<Self> {
        self.collection_path()
            .rsplit_once('/')
            .map(|(owner, _)| Self(owner.to_string()))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Where the document lives.
    pub path: DocPath,
    /// Its fields.
    pub fields: Fields,
}

impl Snapshot {
    /// Decodes the fields into a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Internal`] if the fields do not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, MeshimapError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            MeshimapError::Internal(format!("malformed document {}: {e}", self.path))
        })
    }
}

/// Encodes a typed record into a field map.
///
/// # Errors
///
/// Returns [`MeshimapError::Internal`] if `record` does not serialize to a
/// JSON object.
pub fn encode<T: serde::Serialize>(record: &T) -> Result<Fields, MeshimapError> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        other => Err(MeshimapError::Internal(format!(
            "document must be an object, got {other}"
        ))),
    }
}

/// Canonical text form of a timestamp field.
///
/// Fixed width (millisecond precision, `Z` suffix) so stored timestamps
/// also compare correctly as strings.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reads a timestamp field written by [`format_timestamp`] (or any other
/// RFC 3339 string).
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

/// Client for the remote document database.
///
/// Single-document writes are atomic; there are no multi-document
/// transactions and no conditional writes.
#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Reads one document. `Ok(None)` when it does not exist.
    async fn get(&self, path: &DocPath) -> Result<Option<Snapshot>, MeshimapError>;

    /// Creates or fully replaces a document.
    ///
    /// Every field named in `server_timestamps` is set to the store's own
    /// clock at write time, overriding any value in `fields`.
    async fn set(
        &self,
        path: &DocPath,
        fields: Fields,
        server_timestamps: &[&str],
    ) -> Result<(), MeshimapError>;

    /// Shallow-merges `fields` into a document, creating it if absent.
    async fn merge(
        &self,
        path: &DocPath,
        fields: Fields,
        server_timestamps: &[&str],
    ) -> Result<(), MeshimapError>;

    /// Deletes a document. Deleting an absent document succeeds.
    async fn delete(&self, path: &DocPath) -> Result<(), MeshimapError>;

    /// Lists every document directly inside `collection_path`, ordered by
    /// document ID.
    async fn list(&self, collection_path: &str) -> Result<Vec<Snapshot>, MeshimapError>;

    /// Returns documents in `collection_path` whose `field` equals `value`.
    async fn query_eq(
        &self,
        collection_path: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Snapshot>, MeshimapError>;

    /// Collection-group range query: documents in any collection named
    /// `collection_id`, at any depth, whose timestamp `field` lies in
    /// `[start, end]` (both inclusive).
    async fn query_group_range(
        &self,
        collection_id: &str,
        field: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Snapshot>, MeshimapError>;
}
