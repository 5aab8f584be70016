//! Storage contracts for the document browser, plus a JSON-file vault that
//! implements them for local use and tests.
//!
//! The browser only ever talks to the [`FolderStore`] and [`DocumentStore`]
//! traits; a deployment backed by a remote document database implements the
//! same contracts.

mod activity;
mod util;
mod vault;

use std::io;

use docshelf_folders::{FolderDraft, FolderId, FolderPath, FolderPathError, FolderRecord};
use docshelf_records::{
    DocumentDraft, DocumentId, DocumentQuery, DocumentRecord, Identity, ModuleScope,
};
use thiserror::Error;

pub use activity::{ActivityAction, ActivityEntry};
pub use vault::JsonVault;

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid store payload: {0}")]
    Invalid(String),
    #[error(transparent)]
    Path(#[from] FolderPathError),
    #[error("folder {0} not found")]
    FolderNotFound(String),
    #[error("parent folder {0} not found")]
    ParentNotFound(FolderPath),
    #[error("folder {0} already exists")]
    DuplicateFolder(FolderPath),
    #[error("folder {0} is not empty")]
    FolderNotEmpty(FolderPath),
    #[error("document {0} not found")]
    DocumentNotFound(DocumentId),
}

/// Read and mutate the folder space of a module.
pub trait FolderStore {
    /// Loads every folder record in scope. The hierarchy is derived
    /// client-side from the flat list.
    fn load_folders(&self, scope: &ModuleScope) -> Result<Vec<FolderRecord>, StoreError>;

    /// Creates a folder from the draft, returning the stored record.
    fn create_folder(
        &self,
        scope: &ModuleScope,
        draft: FolderDraft,
        identity: &Identity,
    ) -> Result<FolderRecord, StoreError>;

    /// Renames a folder, cascading the path change to descendant folders and
    /// to documents filed under it.
    fn rename_folder(
        &self,
        id: &FolderId,
        new_name: &str,
        identity: &Identity,
    ) -> Result<(), StoreError>;

    /// Deletes an empty folder. Folders with subfolders or documents are
    /// refused with [`StoreError::FolderNotEmpty`].
    fn delete_folder(&self, id: &FolderId, identity: &Identity) -> Result<(), StoreError>;
}

/// Read and mutate the document space of a module.
pub trait DocumentStore {
    /// Lists documents matching the query. The listing is module-scoped and
    /// flat; folder placement does not restrict it.
    fn search(&self, query: &DocumentQuery) -> Result<Vec<DocumentRecord>, StoreError>;

    /// Registers a new document, assigning id, timestamp, and the next
    /// version number for its file name.
    fn add_document(
        &self,
        scope: &ModuleScope,
        draft: DocumentDraft,
        identity: &Identity,
    ) -> Result<DocumentRecord, StoreError>;

    /// Moves documents to the target folder path. One bulk operation covers
    /// the single-document case with a one-element slice. Every id is
    /// validated before any record changes; a missing id moves nothing.
    fn move_documents(
        &self,
        ids: &[DocumentId],
        target: &FolderPath,
        identity: &Identity,
    ) -> Result<(), StoreError>;
}
