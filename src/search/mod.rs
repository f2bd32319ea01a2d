pub mod local;
pub mod matcher;
pub mod merger;
pub mod orchestrator;
pub mod recent;
pub mod remote;
pub mod selection;
pub mod sequencer;
pub mod translit;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a conversation target.
/// Users are positive, groups and channels are negative (bot API dialog ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub i64);

impl TargetId {
    pub fn is_user(self) -> bool {
        self.0 > 0
    }

    pub fn is_chat(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    User,
    Group,
    Channel,
}

/// A selectable recipient: user, group or channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub kind: TargetKind,
    pub display_name: String,
    /// Derived from `display_name`; `None` when transliteration changes nothing.
    pub transliterated_name: Option<String>,
    pub username: Option<String>,
    /// Unix seconds of the last interaction; the only recency key.
    pub last_interaction: i64,
}

impl Target {
    /// Build a target, deriving the transliterated name from `display_name`.
    pub fn new(
        id: TargetId,
        kind: TargetKind,
        display_name: impl Into<String>,
        username: Option<String>,
        last_interaction: i64,
    ) -> Self {
        let display_name = display_name.into();
        let transliterated_name = translit::transliterated_variant(&display_name);
        Self {
            id,
            kind,
            display_name,
            transliterated_name,
            username,
            last_interaction,
        }
    }
}

/// Monotonically increasing number stamped on each submitted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Trimmed user input. Empty means "show defaults".
    pub text: String,
    pub generation: Generation,
}

impl SearchQuery {
    pub fn new(text: &str, generation: Generation) -> Self {
        Self {
            text: text.trim().to_string(),
            generation,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Why a target is in the result list. Only a tie-breaker, never a ranking key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Recent,
    NameMatch,
    UsernameMatch,
    Remote,
}

/// A single entry of the published result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub target: Target,
    pub match_kind: MatchKind,
    pub source_timestamp: i64,
}

impl SearchResultItem {
    pub fn new(target: Target, match_kind: MatchKind) -> Self {
        let source_timestamp = target.last_interaction;
        Self {
            target,
            match_kind,
            source_timestamp,
        }
    }
}

/// Progress of one result source for the published generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceState {
    /// The source takes no part in this query (empty text).
    Idle,
    Pending,
    Done,
    Failed,
}

/// Selected target ids at publication time, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub ids: Vec<TargetId>,
}

/// What the consumer receives on every republish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsSnapshot {
    pub generation: Generation,
    pub query: String,
    pub items: Vec<SearchResultItem>,
    pub selection: SelectionSnapshot,
    pub local: SourceState,
    pub remote: SourceState,
}

impl ResultsSnapshot {
    /// True once no source for this generation is still outstanding.
    pub fn is_settled(&self) -> bool {
        !matches!(self.local, SourceState::Pending) && !matches!(self.remote, SourceState::Pending)
    }
}
