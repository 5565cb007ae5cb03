//! Connectivity graph error types.

/// Errors loading or storing connectivity snapshots.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// No snapshot stored under this name
    #[error("connectivity snapshot {0:?} not found")]
    NotFound(String),

    /// Snapshot exists but cannot be decoded
    #[error("connectivity snapshot {name:?} is corrupt: {message}")]
    Corrupt { name: String, message: String },

    /// Snapshot names end up in file paths, so they are restricted
    #[error("invalid snapshot name {0:?}")]
    InvalidName(String),

    /// Reading or writing the backing storage failed
    #[error("snapshot storage error for {name:?}: {message}")]
    Storage { name: String, message: String },
}

impl GraphError {
    /// Whether the snapshot was simply absent (as opposed to unreadable).
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound(_))
    }
}
