//! Snapshot storage.
//!
//! Snapshots are written whole: a put replaces the previous document for
//! that name atomically, so readers see either the old or the new snapshot.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use super::ConnectivityGraph;
use super::error::GraphError;

/// Where connectivity snapshots live.
pub trait GraphStore: Send + Sync {
    /// Read and decode the named snapshot.
    fn get_snapshot(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<ConnectivityGraph, GraphError>> + Send;

    /// Replace the named snapshot.
    fn put_snapshot(
        &self,
        name: &str,
        graph: &ConnectivityGraph,
    ) -> impl Future<Output = Result<(), GraphError>> + Send;
}

/// Snapshot names become file names; keep them to a safe alphabet.
fn validate_name(name: &str) -> Result<(), GraphError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(GraphError::InvalidName(name.to_string()))
    }
}

/// One pretty-printed JSON document per snapshot, `{dir}/{name}.json`.
#[derive(Debug, Clone)]
pub struct FileGraphStore {
    dir: PathBuf,
}

impl FileGraphStore {
    /// Store snapshots under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The snapshot directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, GraphError> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.json")))
    }
}

impl GraphStore for FileGraphStore {
    async fn get_snapshot(&self, name: &str) -> Result<ConnectivityGraph, GraphError> {
        let path = self.path_for(name)?;

        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GraphError::NotFound(name.to_string()));
            }
            Err(e) => {
                return Err(GraphError::Storage {
                    name: name.to_string(),
                    message: format!("failed to read {}: {e}", path.display()),
                });
            }
        };

        ConnectivityGraph::from_json(name, &json)
    }

    async fn put_snapshot(&self, name: &str, graph: &ConnectivityGraph) -> Result<(), GraphError> {
        let path = self.path_for(name)?;
        let storage_err = |message: String| GraphError::Storage {
            name: name.to_string(),
            message,
        };

        let json = graph
            .to_json()
            .map_err(|e| storage_err(format!("failed to serialize snapshot: {e}")))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| storage_err(format!("failed to create snapshot directory: {e}")))?;

        // Write next to the target, then rename over it.
        let tmp = self.dir.join(format!(".{name}.json.tmp"));
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| storage_err(format!("failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| storage_err(format!("failed to replace {}: {e}", path.display())))?;

        tracing::debug!(snapshot = name, airports = graph.len(), "stored connectivity snapshot");
        Ok(())
    }
}

/// In-process snapshot store.
///
/// Keeps the encoded documents, so decoding errors surface exactly as they
/// would from disk.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw document, bypassing encoding.
    pub async fn insert_raw(&self, name: impl Into<String>, json: impl Into<String>) {
        self.documents.write().await.insert(name.into(), json.into());
    }
}

impl GraphStore for MemoryGraphStore {
    async fn get_snapshot(&self, name: &str) -> Result<ConnectivityGraph, GraphError> {
        let documents = self.documents.read().await;
        let json = documents
            .get(name)
            .ok_or_else(|| GraphError::NotFound(name.to_string()))?;
        ConnectivityGraph::from_json(name, json)
    }

    async fn put_snapshot(&self, name: &str, graph: &ConnectivityGraph) -> Result<(), GraphError> {
        let json = graph.to_json().map_err(|e| GraphError::Storage {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        self.documents.write().await.insert(name.to_string(), json);
        Ok(())
    }
}
