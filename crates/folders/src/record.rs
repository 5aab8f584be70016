use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use docshelf_records::{Identity, ModuleKind, ProjectRef};
use serde::{Deserialize, Serialize};

use crate::path::FolderPath;

static NEXT_FOLDER_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier for folders. Renames change a folder's path but never
/// its id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    /// Generates a fresh identifier. The embedded process id keeps
    /// identifiers unique across processes sharing one vault; the counter
    /// suffix keeps them unique within a process.
    pub fn generate() -> Self {
        let seq = NEXT_FOLDER_ID.fetch_add(1, Ordering::Relaxed);
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self(format!("{secs:08x}-{:08x}-{seq:04x}", std::process::id()))
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Business entity a folder is grouped under in entity view, e.g.
/// `{ kind: "vendors", label: "Acme Pte Ltd" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: String,
    pub label: String,
}

impl EntityRef {
    pub fn new(kind: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            label: label.into(),
        }
    }
}

/// Flat persisted folder record. The hierarchy is derived from paths by the
/// tree builder, never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub id: FolderId,
    pub name: String,
    pub path: FolderPath,
    pub module: ModuleKind,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default)]
    pub entity: Option<EntityRef>,
    pub created_by: Identity,
    pub created_at_unix: i64,
}

/// Input for creating a folder; the store assigns id, path, and timestamp.
#[derive(Clone, Debug)]
pub struct FolderDraft {
    pub name: String,
    pub parent: Option<FolderPath>,
    pub project: Option<ProjectRef>,
    pub entity: Option<EntityRef>,
}

impl FolderDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            project: None,
            entity: None,
        }
    }

    pub fn under(mut self, parent: FolderPath) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn for_project(mut self, project: ProjectRef) -> Self {
        self.project = Some(project);
        self
    }

    pub fn for_entity(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }
}
