use serde::Deserialize;
use serde::Serialize;

use crate::Revision;

/// Raw or projected content of an entry.
///
/// Content equality is structural: two JSON values with the same shape are
/// equal regardless of the bytes they were committed as. This is what makes
/// the watch layer content-aware rather than notification-driven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryContent {
    Text(String),
    Json(serde_json::Value),
}

impl EntryContent {
    pub fn text(content: impl Into<String>) -> Self {
        EntryContent::Text(content.into())
    }

    pub fn json(content: serde_json::Value) -> Self {
        EntryContent::Json(content)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            EntryContent::Text(text) => Some(text),
            EntryContent::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            EntryContent::Text(_) => None,
            EntryContent::Json(value) => Some(value),
        }
    }
}

/// The result of resolving a [`Query`](crate::Query) at a [`Revision`]:
/// an immutable snapshot of one path's (possibly projected) content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    revision: Revision,
    path: String,
    content: EntryContent,
}

impl Entry {
    pub fn new(
        revision: Revision,
        path: impl Into<String>,
        content: EntryContent,
    ) -> Self {
        Self {
            revision,
            path: path.into(),
            content,
        }
    }

    /// The revision this entry was observed at.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &EntryContent {
        &self.content
    }
}
