use std::collections::HashSet;

use super::{
    Generation, MatchKind, ResultsSnapshot, SearchQuery, SearchResultItem, SelectionSnapshot,
    SourceState, Target, TargetId,
};

/// Combine the three sources into one deduplicated list.
///
/// Order is recent, then local (already recency-sorted), then remote in the
/// order the service returned. When an id shows up more than once the first
/// copy wins, which is also the richer one: recent beats local beats remote.
pub fn merge(
    recent: &[Target],
    local: &[SearchResultItem],
    remote: &[Target],
) -> Vec<SearchResultItem> {
    let mut seen: HashSet<TargetId> = HashSet::new();
    let mut merged = Vec::with_capacity(recent.len() + local.len() + remote.len());

    let candidates = recent
        .iter()
        .map(|t| (t, MatchKind::Recent))
        .chain(local.iter().map(|item| (&item.target, item.match_kind)))
        .chain(remote.iter().map(|t| (t, MatchKind::Remote)));

    for (target, kind) in candidates {
        if seen.insert(target.id) {
            merged.push(SearchResultItem::new(target.clone(), kind));
        }
    }

    merged
}

/// Partial results gathered for the active generation.
#[derive(Debug)]
pub struct ResultMerger {
    generation: Generation,
    query: String,
    local: Vec<SearchResultItem>,
    remote: Vec<Target>,
    local_state: SourceState,
    remote_state: SourceState,
}

impl Default for ResultMerger {
    fn default() -> Self {
        Self {
            generation: Generation(0),
            query: String::new(),
            local: Vec::new(),
            remote: Vec::new(),
            local_state: SourceState::Idle,
            remote_state: SourceState::Idle,
        }
    }
}

impl ResultMerger {
    /// Forget the previous generation's partials.
    pub fn reset(&mut self, query: &SearchQuery) {
        let state = if query.is_empty() {
            SourceState::Idle
        } else {
            SourceState::Pending
        };
        self.generation = query.generation;
        self.query = query.text.clone();
        self.local.clear();
        self.remote.clear();
        self.local_state = state;
        self.remote_state = state;
    }

    pub fn apply_local(&mut self, items: Option<Vec<SearchResultItem>>) {
        match items {
            Some(items) => {
                self.local = items;
                self.local_state = SourceState::Done;
            }
            None => {
                self.local.clear();
                self.local_state = SourceState::Failed;
            }
        }
    }

    pub fn apply_remote(&mut self, targets: Option<Vec<Target>>) {
        match targets {
            Some(targets) => {
                self.remote = targets;
                self.remote_state = SourceState::Done;
            }
            None => {
                self.remote.clear();
                self.remote_state = SourceState::Failed;
            }
        }
    }

    /// Build the published view. `recent` only counts for the empty query.
    pub fn snapshot(&self, recent: &[Target], selection: SelectionSnapshot) -> ResultsSnapshot {
        let items = if self.query.is_empty() {
            merge(recent, &[], &[])
        } else {
            merge(&[], &self.local, &self.remote)
        };
        ResultsSnapshot {
            generation: self.generation,
            query: self.query.clone(),
            items,
            selection,
            local: self.local_state,
            remote: self.remote_state,
        }
    }
}
