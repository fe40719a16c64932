//! PostgreSQL implementation of the document store.
//!
//! Every document is one row of the `documents` table (see `migrations/`),
//! with its fields in a JSONB column. Server timestamps are produced by
//! the database clock inside the write statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use super::{DocPath, DocumentStore, Fields, Snapshot, format_timestamp};
use crate::error::MeshimapError;

/// JSONB object mapping each name in `$5` to the current database time.
const SERVER_TIMESTAMPS_SQL: &str = "(SELECT COALESCE(jsonb_object_agg(f, to_jsonb(to_char(now() AT TIME ZONE 'UTC', 'YYYY-MM-DD\"T\"HH24:MI:SS.MS\"Z\"'))), '{}'::jsonb) FROM unnest($5::text[]) AS f)";

/// PostgreSQL-backed document store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`MeshimapError::Store`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), MeshimapError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| MeshimapError::Store(e.to_string()))
    }

    async fn upsert(
        &self,
        path: &DocPath,
        fields: Fields,
        server_timestamps: &[&str],
        merge: bool,
    ) -> Result<(), MeshimapError> {
        let on_conflict = if merge {
            "documents.data || EXCLUDED.data"
        } else {
            "EXCLUDED.data"
        };
        let sql = format!(
            "INSERT INTO documents (path, collection_path, collection_id, data, updated_at) \
             VALUES ($1, $2, $3, $4::jsonb || {SERVER_TIMESTAMPS_SQL}, now()) \
             ON CONFLICT (path) DO UPDATE SET data = {on_conflict}, updated_at = now()"
        );
        let stamps: Vec<String> = server_timestamps.iter().map(|s| (*s).to_string()).collect();

        sqlx::query(&sql)
            .bind(path.as_str())
            .bind(path.collection_path())
            .bind(path.collection_id())
            .bind(Value::Object(fields))
            .bind(stamps)
            .execute(&self.pool)
            .await
            .map_err(|e| MeshimapError::Store(e.to_string()))?;
        Ok(())
    }
}

fn into_snapshots(rows: Vec<(String, Value)>) -> Result<Vec<Snapshot>, MeshimapError> {
    rows.into_iter()
        .map(|(path, data)| {
            let path = DocPath::parse(&path)?;
            match data {
                Value::Object(fields) => Ok(Snapshot { path, fields }),
                other => Err(MeshimapError::Store(format!(
                    "document {path} is not an object: {other}"
                ))),
            }
        })
        .collect()
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Snapshot>, MeshimapError> {
        let row = sqlx::query_as::<_, (String, Value)>(
            "SELECT path, data FROM documents WHERE path = $1",
        )
        .bind(path.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MeshimapError::Store(e.to_string()))?;

        Ok(into_snapshots(row.into_iter().collect())?.into_iter().next())
    }

    async fn set(
        &self,
        path: &DocPath,
        fields: Fields,
        server_timestamps: &[&str],
    ) -> Result<(), MeshimapError> {
        self.upsert(path, fields, server_timestamps, false).await
    }

    async fn merge(
        &self,
        path: &DocPath,
        fields: Fields,
        server_timestamps: &[&str],
    ) -> Result<(), MeshimapError> {
        self.upsert(path, fields, server_timestamps, true).await
    }

    async fn delete(&self, path: &DocPath) -> Result<(), MeshimapError> {
        sqlx::query("DELETE FROM documents WHERE path = $1")
            .bind(path.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| MeshimapError::Store(e.to_string()))?;
        Ok(())
    }

    async fn list(&self, collection_path: &str) -> Result<Vec<Snapshot>, MeshimapError> {
        let rows = sqlx::query_as::<_, (String, Value)>(
            "SELECT path, data FROM documents WHERE collection_path = $1 ORDER BY path",
        )
        .bind(collection_path)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MeshimapError::Store(e.to_string()))?;

        into_snapshots(rows)
    }

    async fn query_eq(
        &self,
        collection_path: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Snapshot>, MeshimapError> {
        let rows = sqlx::query_as::<_, (String, Value)>(
            "SELECT path, data FROM documents \
             WHERE collection_path = $1 AND data -> $2 = $3::jsonb ORDER BY path",
        )
        .bind(collection_path)
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MeshimapError::Store(e.to_string()))?;

        into_snapshots(rows)
    }

    async fn query_group_range(
        &self,
        collection_id: &str,
        field: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Snapshot>, MeshimapError> {
        let rows = sqlx::query_as::<_, (String, Value)>(
            "SELECT path, data FROM documents \
             WHERE collection_id = $1 AND data ->> $2 >= $3 AND data ->> $2 <= $4 \
             ORDER BY path",
        )
        .bind(collection_id)
        .bind(field)
        .bind(format_timestamp(start))
        .bind(format_timestamp(end))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MeshimapError::Store(e.to_string()))?;

        into_snapshots(rows)
    }
}
