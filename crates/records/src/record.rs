use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::module::ModuleKind;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier for uploaded documents.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generates a fresh identifier. The embedded process id keeps
    /// identifiers unique across processes sharing one vault; the counter
    /// suffix keeps them unique within a process.
    pub fn generate() -> Self {
        let seq = NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed);
        Self(format!(
            "{:08x}-{:08x}-{seq:06x}",
            current_unix_seconds(),
            std::process::id()
        ))
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a project a record may be scoped under.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Project reference with a display name, used where a bare id is not enough
/// for rendering (folder grouping, breadcrumbs).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: ProjectId,
    pub name: String,
}

impl ProjectRef {
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Metadata describing one uploaded file (not the file bytes themselves).
///
/// The remote store is authoritative; any in-memory list of these is a cached
/// snapshot invalidated by explicit reload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub file_name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub mime_type: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_version")]
    pub version: u32,
    pub uploaded_at_unix: i64,
    pub uploaded_by: Identity,
    pub module: ModuleKind,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Containing folder path ("a/b/c"), if the document has been filed.
    #[serde(default)]
    pub folder_path: Option<String>,
}

fn default_version() -> u32 {
    1
}

/// Input for registering a new document; the store assigns id and timestamp.
#[derive(Clone, Debug)]
pub struct DocumentDraft {
    pub file_name: String,
    pub title: String,
    pub description: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub tags: Vec<String>,
    pub folder_path: Option<String>,
}

impl DocumentDraft {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        let file_name = file_name.into();
        let title = file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_string())
            .unwrap_or_else(|| file_name.clone());
        Self {
            file_name,
            title,
            description: String::new(),
            mime_type: mime_type.into(),
            size_bytes,
            tags: Vec::new(),
            folder_path: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_folder(mut self, folder_path: impl Into<String>) -> Self {
        self.folder_path = Some(folder_path.into());
        self
    }
}

pub(crate) fn current_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_ids_embed_the_process_id() {
        // Another process generating in the same second must still produce a
        // different id.
        let id = DocumentId::generate();
        let pid = format!("{:08x}", std::process::id());
        assert_eq!(id.as_str().split('-').nth(1), Some(pid.as_str()));
    }

    #[test]
    fn draft_derives_title_from_file_stem() {
        let draft = DocumentDraft::new("invoice-jan.pdf", "application/pdf", 1024);
        assert_eq!(draft.title, "invoice-jan");
        let no_ext = DocumentDraft::new("README", "text/plain", 12);
        assert_eq!(no_ext.title, "README");
    }

    #[test]
    fn record_deserializes_with_defaults() {
        let json = r#"{
            "id": "doc-1",
            "file_name": "quote.pdf",
            "title": "quote",
            "mime_type": "application/pdf",
            "size_bytes": 2048,
            "uploaded_at_unix": 1700000000,
            "uploaded_by": { "user_id": "u1", "user_name": "Alex" },
            "module": "procurement"
        }"#;
        let record: DocumentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.version, 1);
        assert!(record.tags.is_empty());
        assert!(record.folder_path.is_none());
        assert_eq!(record.module, ModuleKind::Procurement);
    }
}
