use std::fmt;

use super::matcher::match_kind;
use super::Target;

/// Synchronous store of known targets. Called from the local search worker
/// thread, never from the apply loop.
///
/// Implementations may return extra candidates; the orchestrator filters
/// them through [`match_kind`] and sorts by recency itself.
pub trait LocalIndex: Send + Sync + 'static {
    fn match_targets(&self, tokens: &[String]) -> Result<Vec<Target>, LocalIndexError>;
}

#[derive(Debug)]
pub enum LocalIndexError {
    Store(sqlite::Error),
    Unavailable(String),
}

impl fmt::Display for LocalIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalIndexError::Store(e) => write!(f, "local index store error: {}", e),
            LocalIndexError::Unavailable(msg) => write!(f, "local index unavailable: {}", msg),
        }
    }
}

impl std::error::Error for LocalIndexError {}

impl From<sqlite::Error> for LocalIndexError {
    fn from(e: sqlite::Error) -> Self {
        LocalIndexError::Store(e)
    }
}

/// In-memory index over a fixed target list, scanned in list order.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    targets: Vec<Target>,
}

impl MemoryIndex {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }
}

impl LocalIndex for MemoryIndex {
    fn match_targets(&self, tokens: &[String]) -> Result<Vec<Target>, LocalIndexError> {
        Ok(self
            .targets
            .iter()
            .filter(|t| match_kind(t, tokens).is_some())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::matcher::query_tokens;
    use crate::search::{TargetId, TargetKind};

    fn target(id: i64, name: &str) -> Target {
        Target::new(TargetId(id), TargetKind::User, name, None, id)
    }

    #[test]
    fn test_memory_index_filters() {
        let index = MemoryIndex::new(vec![target(1, "Alice"), target(2, "Bob")]);
        let found = index.match_targets(&query_tokens("al")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, TargetId(1));
    }

    #[test]
    fn test_memory_index_keeps_list_order() {
        let index = MemoryIndex::new(vec![target(2, "Alicia"), target(1, "Alice")]);
        let found = index.match_targets(&query_tokens("ali")).unwrap();
        let ids: Vec<i64> = found.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_empty_tokens_match_nothing() {
        let index = MemoryIndex::new(vec![target(1, "Alice")]);
        assert!(index.match_targets(&[]).unwrap().is_empty());
    }
}
