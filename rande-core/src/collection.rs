//! The three independent record collections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three record sets. Each collection is persisted in its own
/// local slot and mirrored to its own remote document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Events,
    Notes,
    Papers,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Events, Collection::Notes, Collection::Papers];

    /// Document id under which the collection lives in the remote store.
    pub fn doc_id(&self) -> &'static str {
        match self {
            Collection::Events => "events",
            Collection::Notes => "notes",
            Collection::Papers => "papers",
        }
    }

    /// File name of the local slot holding the serialized sequence.
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Events => "events.json",
            Collection::Notes => "notes.json",
            Collection::Papers => "papers.json",
        }
    }

    /// File name of the last-synced-at marker used by reconciliation.
    pub fn marker_file_name(&self) -> &'static str {
        match self {
            Collection::Events => "events.synced_at",
            Collection::Notes => "notes.synced_at",
            Collection::Papers => "papers.synced_at",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.doc_id())
    }
}
