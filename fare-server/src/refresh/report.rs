//! What a refresh run did.

/// Why a source stopped before its request cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source's connectivity snapshot could not be loaded
    GraphUnavailable,
    /// The snapshot has no routes to sample
    NoRoutes,
    /// The source rejected a request as malformed
    MalformedRequest,
    /// The configured day window is empty
    InvalidSampling,
}

/// Per-source outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReport {
    pub name: String,
    pub attempts: usize,
    pub successes: u64,
    pub legs: usize,
    pub stop: Option<StopReason>,
}

impl SourceReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attempts: 0,
            successes: 0,
            legs: 0,
            stop: None,
        }
    }
}

/// Outcome of one refresh run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub sources: Vec<SourceReport>,
    pub records_written: usize,
    pub failed_chunks: usize,
    pub dropped_legs: usize,
}

impl RefreshReport {
    /// Report for the named source.
    pub fn source(&self, name: &str) -> Option<&SourceReport> {
        self.sources.iter().find(|s| s.name == name)
    }
}
