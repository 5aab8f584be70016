use std::fmt;

use docshelf_records::Identity;
use serde::{Deserialize, Serialize};

/// Kind of mutation recorded in the activity log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    FolderCreated,
    FolderRenamed,
    FolderDeleted,
    DocumentAdded,
    DocumentsMoved,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::FolderCreated => "folder.created",
            ActivityAction::FolderRenamed => "folder.renamed",
            ActivityAction::FolderDeleted => "folder.deleted",
            ActivityAction::DocumentAdded => "document.added",
            ActivityAction::DocumentsMoved => "documents.moved",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only record of one successful mutation and the actor behind it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub action: ActivityAction,
    pub actor: Identity,
    pub detail: String,
    pub at_unix: i64,
}

impl ActivityEntry {
    pub fn new(action: ActivityAction, actor: &Identity, detail: impl Into<String>, at_unix: i64) -> Self {
        Self {
            action,
            actor: actor.clone(),
            detail: detail.into(),
            at_unix,
        }
    }
}
