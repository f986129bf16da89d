//! Persistence collaborator for tree documents.
//!
//! The editor core treats storage as fire-and-forget: a failed write is
//! surfaced as a notification and local editing continues. Both stores are
//! idempotent upserts keyed by tree id, and fetching an unknown id yields
//! an empty document rather than an error.

use faultcanvas_core::{GraphDocument, TreeKind};
use parking_lot::{Mutex, RwLock};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

mod schema;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Malformed document: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Other error: {0}")]
    Other(String),
}

/// Store/fetch API keyed by tree id. `store_graph` is an idempotent upsert
/// and echoes the stored document back, mirroring the original HTTP
/// collaborator.
pub trait GraphStore: Send + Sync {
    fn fetch_graph(&self, tree_id: &str) -> Result<GraphDocument, StorageError>;
    fn store_graph(&self, document: &GraphDocument) -> Result<GraphDocument, StorageError>;
}

/// SQLite-backed store: one row per tree, the whole document as JSON.
pub struct SqliteGraphStore {
    conn: Mutex<Connection>,
}

impl SqliteGraphStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        schema::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        schema::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Tree ids present in the store, in insertion-independent sorted
    /// order.
    pub fn list_trees(&self) -> Result<Vec<(String, TreeKind)>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT tree_id, kind FROM tree_graph ORDER BY tree_id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (tree_id, kind) = row?;
            let kind = kind
                .parse::<TreeKind>()
                .map_err(|e| StorageError::Other(e.to_string()))?;
            out.push((tree_id, kind));
        }
        Ok(out)
    }
}

impl GraphStore for SqliteGraphStore {
    fn fetch_graph(&self, tree_id: &str) -> Result<GraphDocument, StorageError> {
        let conn = self.conn.lock();
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM tree_graph WHERE tree_id = ?1",
                params![tree_id],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => {
                tracing::debug!(tree_id, "no stored graph, returning empty document");
                Ok(GraphDocument::empty(tree_id, TreeKind::default()))
            }
        }
    }

    fn store_graph(&self, document: &GraphDocument) -> Result<GraphDocument, StorageError> {
        let json = serde_json::to_string(document)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO tree_graph (tree_id, kind, document) VALUES (?1, ?2, ?3)
             ON CONFLICT(tree_id) DO UPDATE SET kind = excluded.kind, document = excluded.document",
            params![document.tree_id, document.kind.to_string(), json],
        )?;
        Ok(document.clone())
    }
}

/// In-memory store used by tests and as an offline fallback.
#[derive(Default)]
pub struct MemoryGraphStore {
    documents: RwLock<HashMap<String, GraphDocument>>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl GraphStore for MemoryGraphStore {
    fn fetch_graph(&self, tree_id: &str) -> Result<GraphDocument, StorageError> {
        Ok(self
            .documents
            .read()
            .get(tree_id)
            .cloned()
            .unwrap_or_else(|| GraphDocument::empty(tree_id, TreeKind::default())))
    }

    fn store_graph(&self, document: &GraphDocument) -> Result<GraphDocument, StorageError> {
        self.documents
            .write()
            .insert(document.tree_id.clone(), document.clone());
        Ok(document.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultcanvas_core::{Node, NodeType};

    fn sample_document(tree_id: &str) -> GraphDocument {
        GraphDocument::starter(tree_id, TreeKind::FaultTree)
    }

    #[test]
    fn sqlite_round_trip() {
        let store = SqliteGraphStore::open_in_memory().unwrap();
        let doc = sample_document("ft-1");
        store.store_graph(&doc).unwrap();
        let fetched = store.fetch_graph("ft-1").unwrap();
        assert_eq!(fetched, doc);
    }

    #[test]
    fn sqlite_fetch_unknown_is_empty() {
        let store = SqliteGraphStore::open_in_memory().unwrap();
        let fetched = store.fetch_graph("missing").unwrap();
        assert!(fetched.is_empty());
        assert_eq!(fetched.tree_id, "missing");
    }

    #[test]
    fn sqlite_store_is_idempotent_upsert() {
        let store = SqliteGraphStore::open_in_memory().unwrap();
        let mut doc = sample_document("ft-1");
        store.store_graph(&doc).unwrap();

        doc.nodes.push(Node::new("extra", NodeType::BasicEvent));
        store.store_graph(&doc).unwrap();
        store.store_graph(&doc).unwrap();

        let fetched = store.fetch_graph("ft-1").unwrap();
        assert_eq!(fetched.nodes.len(), 4);
        assert_eq!(store.list_trees().unwrap().len(), 1);
    }

    #[test]
    fn sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trees.db");
        {
            let store = SqliteGraphStore::open(&path).unwrap();
            store.store_graph(&sample_document("ft-1")).unwrap();
        }
        let store = SqliteGraphStore::open(&path).unwrap();
        assert_eq!(store.fetch_graph("ft-1").unwrap(), sample_document("ft-1"));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryGraphStore::new();
        assert!(store.fetch_graph("t").unwrap().is_empty());
        store.store_graph(&sample_document("t")).unwrap();
        assert_eq!(store.fetch_graph("t").unwrap(), sample_document("t"));
        assert_eq!(store.len(), 1);
    }
}
