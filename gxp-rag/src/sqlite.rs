//! Persistent vector index stored in a single SQLite file.
//!
//! [`SqliteVectorIndex`] keeps collection definitions and items (text,
//! metadata, and little-endian `f32` embedding blobs) on disk and answers
//! nearest-neighbour queries by exhaustive distance computation. The index
//! file lives at `<dir>/index.sqlite3`, so reopening the same directory
//! attaches to the same collections.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::Mutex;
use tracing::debug;

use crate::document::{ChunkMetadata, IndexedItem, RetrievalResult};
use crate::error::{RagError, Result};
use crate::vectorstore::{CollectionSpec, DistanceMetric, VectorIndex, sort_by_distance};

/// File name of the database inside the index directory.
pub const INDEX_FILE_NAME: &str = "index.sqlite3";

const BACKEND: &str = "sqlite";

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS collections (
    name        TEXT PRIMARY KEY,
    dimensions  INTEGER NOT NULL,
    metric      TEXT NOT NULL,
    description TEXT,
    created_at  INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS items (
    collection   TEXT NOT NULL REFERENCES collections(name) ON DELETE CASCADE,
    id           TEXT NOT NULL,
    text         TEXT NOT NULL,
    source       TEXT NOT NULL,
    chunk_id     INTEGER NOT NULL,
    total_chunks INTEGER NOT NULL,
    embedding    BLOB NOT NULL,
    PRIMARY KEY (collection, id)
);
";

/// A [`VectorIndex`] persisted in SQLite.
///
/// # Example
///
/// ```rust,ignore
/// use gxp_rag::{CollectionSpec, SqliteVectorIndex, VectorIndex};
///
/// let index = SqliteVectorIndex::open("vector_db_openai")?;
/// index.open_or_create(&CollectionSpec::new("gxp_documents_openai", 1536)).await?;
/// ```
pub struct SqliteVectorIndex {
    conn: Mutex<Connection>,
}

impl SqliteVectorIndex {
    /// Open or create the index stored under `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join(INDEX_FILE_NAME)).map_err(map_err)?;
        debug!(path = %dir.display(), "opened sqlite vector index");
        Self::init(conn)
    }

    /// Open a private in-memory database with the same schema.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory().map_err(map_err)?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", 1).map_err(map_err)?;
        conn.execute_batch(SCHEMA_SQL).map_err(map_err)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

fn map_err(e: rusqlite::Error) -> RagError {
    RagError::VectorStoreError { backend: BACKEND.to_string(), message: e.to_string() }
}

fn invalid(message: impl Into<String>) -> RagError {
    RagError::VectorStoreError { backend: BACKEND.to_string(), message: message.into() }
}

fn to_i64(value: usize, field: &str) -> Result<i64> {
    i64::try_from(value).map_err(|_| invalid(format!("{field} does not fit in an integer column")))
}

fn to_usize(value: i64, field: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| invalid(format!("stored {field} is out of range: {value}")))
}

fn missing(collection: &str) -> RagError {
    invalid(format!("collection '{collection}' does not exist"))
}

fn load_spec(conn: &Connection, name: &str) -> Result<Option<CollectionSpec>> {
    let row = conn
        .query_row(
            "SELECT dimensions, metric, description FROM collections WHERE name = ?1",
            params![name],
            |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, Option<String>>(2)?))
            },
        )
        .optional()
        .map_err(map_err)?;

    let Some((dimensions, metric, description)) = row else {
        return Ok(None);
    };
    let metric = DistanceMetric::parse(&metric)
        .ok_or_else(|| invalid(format!("unknown distance metric '{metric}'")))?;
    Ok(Some(CollectionSpec {
        name: name.to_string(),
        dimensions: to_usize(dimensions, "dimensions")?,
        metric,
        description,
    }))
}

fn insert_items(conn: &mut Connection, spec: &CollectionSpec, items: &[IndexedItem]) -> Result<()> {
    for item in items {
        spec.check_dimensions(BACKEND, &item.embedding)?;
    }

    let tx = conn.transaction().map_err(map_err)?;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO items (collection, id, text, source, chunk_id, total_chunks, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(collection, id) DO UPDATE SET
                     text = excluded.text,
                     source = excluded.source,
                     chunk_id = excluded.chunk_id,
                     total_chunks = excluded.total_chunks,
                     embedding = excluded.embedding",
            )
            .map_err(map_err)?;
        for item in items {
            stmt.execute(params![
                spec.name,
                item.id,
                item.text,
                item.metadata.source,
                to_i64(item.metadata.chunk_id, "chunk_id")?,
                to_i64(item.metadata.total_chunks, "total_chunks")?,
                encode_embedding(&item.embedding),
            ])
            .map_err(map_err)?;
        }
    }
    tx.commit().map_err(map_err)
}

fn query_items(
    conn: &Connection,
    spec: &CollectionSpec,
    embedding: &[f32],
    top_k: usize,
) -> Result<Vec<RetrievalResult>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, text, source, chunk_id, total_chunks, embedding
             FROM items WHERE collection = ?1",
        )
        .map_err(map_err)?;
    let rows = stmt
        .query_map(params![spec.name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, Vec<u8>>(5)?,
            ))
        })
        .map_err(map_err)?;

    let mut results = Vec::new();
    for row in rows {
        let (id, text, source, chunk_id, total_chunks, blob) = row.map_err(map_err)?;
        let candidate = decode_embedding(&blob, spec.dimensions)?;
        results.push(RetrievalResult {
            id,
            text,
            metadata: ChunkMetadata {
                source,
                chunk_id: to_usize(chunk_id, "chunk_id")?,
                total_chunks: to_usize(total_chunks, "total_chunks")?,
            },
            distance: spec.metric.distance(&candidate, embedding),
        });
    }

    sort_by_distance(&mut results);
    results.truncate(top_k);
    Ok(results)
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    fn backend(&self) -> &str {
        BACKEND
    }

    async fn collection(&self, name: &str) -> Result<Option<CollectionSpec>> {
        let conn = self.conn.lock().await;
        load_spec(&conn, name)
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO collections (name, dimensions, metric, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                spec.name,
                to_i64(spec.dimensions, "dimensions")?,
                spec.metric.as_str(),
                spec.description,
                chrono::Utc::now().timestamp(),
            ],
        )
        .map_err(map_err)?;
        debug!(collection = %spec.name, dimensions = spec.dimensions, "created sqlite collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM collections WHERE name = ?1", params![name]).map_err(map_err)?;
        debug!(collection = name, "deleted sqlite collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, items: &[IndexedItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.lock().await;
        let spec = load_spec(&conn, collection)?.ok_or_else(|| missing(collection))?;
        insert_items(&mut conn, &spec, items)?;
        debug!(collection, count = items.len(), "upserted items");
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalResult>> {
        let conn = self.conn.lock().await;
        let spec = load_spec(&conn, collection)?.ok_or_else(|| missing(collection))?;
        spec.check_dimensions(BACKEND, embedding)?;
        query_items(&conn, &spec, embedding, top_k)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.conn.lock().await;
        if load_spec(&conn, collection)?.is_none() {
            return Err(missing(collection));
        }
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM items WHERE collection = ?1", params![collection], |row| {
                row.get(0)
            })
            .map_err(map_err)?;
        to_usize(count, "count")
    }
}

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(std::mem::size_of_val(vector));
    for &value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn decode_embedding(blob: &[u8], dimensions: usize) -> Result<Vec<f32>> {
    let expected_len = dimensions * std::mem::size_of::<f32>();
    if blob.len() != expected_len {
        return Err(invalid(format!(
            "invalid embedding byte length: expected {expected_len}, got {}",
            blob.len()
        )));
    }
    Ok(blob.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_blob_round_trips() {
        let vector = vec![0.25f32, -1.5, 3.0];
        let blob = encode_embedding(&vector);
        assert_eq!(blob.len(), 12);
        assert_eq!(decode_embedding(&blob, 3).unwrap(), vector);
        assert!(decode_embedding(&blob, 4).is_err());
    }
}
