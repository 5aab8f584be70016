use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use docshelf_folders::{FolderDraft, FolderId, FolderPath, FolderRecord};
use docshelf_records::{
    retain_latest, sort_documents, DocumentDraft, DocumentId, DocumentQuery, DocumentRecord,
    Identity, ModuleScope,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::activity::{ActivityAction, ActivityEntry};
use crate::util::{current_timestamp, write_atomic};
use crate::{DocumentStore, FolderStore, StoreError};

const FOLDERS_FILE: &str = "folders.json";
const DOCUMENTS_FILE: &str = "documents.json";
const ACTIVITY_FILE: &str = "activity.json";

/// Local vault persisting folders, documents, and the activity log as JSON
/// files under one directory. Missing files read as empty collections; every
/// write replaces the file atomically.
#[derive(Debug, Clone)]
pub struct JsonVault {
    root: PathBuf,
}

impl JsonVault {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the full activity log, oldest entry first.
    pub fn activity(&self) -> Result<Vec<ActivityEntry>, StoreError> {
        self.load_file(ACTIVITY_FILE)
    }

    fn load_file<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, StoreError> {
        match fs::read_to_string(self.root.join(name)) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|err| StoreError::Invalid(err.to_string()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn save_file<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let payload =
            serde_json::to_vec_pretty(value).map_err(|err| StoreError::Invalid(err.to_string()))?;
        write_atomic(&self.root.join(name), &payload)?;
        Ok(())
    }

    fn record_activity(
        &self,
        action: ActivityAction,
        actor: &Identity,
        detail: String,
    ) -> Result<(), StoreError> {
        let mut log: Vec<ActivityEntry> = self.load_file(ACTIVITY_FILE)?;
        log.push(ActivityEntry::new(action, actor, detail, current_timestamp()));
        self.save_file(ACTIVITY_FILE, &log)
    }
}

/// Grouping identity of a folder record: two records are siblings only when
/// module, project, and entity all agree.
fn same_group(a: &FolderRecord, b: &FolderRecord) -> bool {
    a.module == b.module
        && a.project.as_ref().map(|p| &p.id) == b.project.as_ref().map(|p| &p.id)
        && a.entity == b.entity
}

/// True when a document sits in the folder's module/project scope. Documents
/// carry no entity tag, so entity grouping cannot narrow this further.
fn in_folder_scope(folder: &FolderRecord, document: &DocumentRecord) -> bool {
    document.module == folder.module
        && document.project_id.as_ref() == folder.project.as_ref().map(|p| &p.id)
}

impl FolderStore for JsonVault {
    fn load_folders(&self, scope: &ModuleScope) -> Result<Vec<FolderRecord>, StoreError> {
        let mut folders: Vec<FolderRecord> = self.load_file(FOLDERS_FILE)?;
        folders.retain(|record| {
            scope.accepts(record.module, record.project.as_ref().map(|p| &p.id))
        });
        folders.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(folders)
    }

    fn create_folder(
        &self,
        scope: &ModuleScope,
        draft: FolderDraft,
        identity: &Identity,
    ) -> Result<FolderRecord, StoreError> {
        let path = match &draft.parent {
            Some(parent) => parent.join(&draft.name)?,
            None => FolderPath::from_segments([draft.name.as_str()])?,
        };
        let record = FolderRecord {
            id: FolderId::generate(),
            name: path.name().to_string(),
            path,
            module: scope.module,
            project: draft.project,
            entity: draft.entity,
            created_by: identity.clone(),
            created_at_unix: current_timestamp(),
        };

        let mut folders: Vec<FolderRecord> = self.load_file(FOLDERS_FILE)?;
        if let Some(parent) = &draft.parent {
            let parent_exists = folders
                .iter()
                .any(|existing| same_group(existing, &record) && &existing.path == parent);
            if !parent_exists {
                return Err(StoreError::ParentNotFound(parent.clone()));
            }
        }
        if folders
            .iter()
            .any(|existing| same_group(existing, &record) && existing.path == record.path)
        {
            return Err(StoreError::DuplicateFolder(record.path));
        }

        folders.push(record.clone());
        self.save_file(FOLDERS_FILE, &folders)?;
        self.record_activity(
            ActivityAction::FolderCreated,
            identity,
            record.path.to_string(),
        )?;
        debug!(path = %record.path, id = %record.id, "folder created");
        Ok(record)
    }

    fn rename_folder(
        &self,
        id: &FolderId,
        new_name: &str,
        identity: &Identity,
    ) -> Result<(), StoreError> {
        let mut folders: Vec<FolderRecord> = self.load_file(FOLDERS_FILE)?;
        let index = folders
            .iter()
            .position(|record| &record.id == id)
            .ok_or_else(|| StoreError::FolderNotFound(id.to_string()))?;

        let old_path = folders[index].path.clone();
        let new_path = match old_path.parent() {
            Some(parent) => parent.join(new_name)?,
            None => FolderPath::from_segments([new_name])?,
        };
        if new_path == old_path {
            return Ok(());
        }
        if folders.iter().enumerate().any(|(i, existing)| {
            i != index && same_group(existing, &folders[index]) && existing.path == new_path
        }) {
            return Err(StoreError::DuplicateFolder(new_path));
        }

        let target = folders[index].clone();
        folders[index].name = new_path.name().to_string();
        for record in folders.iter_mut() {
            if same_group(record, &target) {
                if let Some(updated) = record.path.reparent(&old_path, &new_path) {
                    record.path = updated;
                }
            }
        }

        let mut documents: Vec<DocumentRecord> = self.load_file(DOCUMENTS_FILE)?;
        let mut refiled = 0usize;
        for document in documents.iter_mut() {
            if !in_folder_scope(&target, document) {
                continue;
            }
            let filed = document
                .folder_path
                .as_deref()
                .and_then(FolderPath::parse_opt);
            if let Some(updated) = filed.and_then(|path| path.reparent(&old_path, &new_path)) {
                document.folder_path = Some(updated.to_string());
                refiled += 1;
            }
        }

        self.save_file(FOLDERS_FILE, &folders)?;
        if refiled > 0 {
            self.save_file(DOCUMENTS_FILE, &documents)?;
        }
        self.record_activity(
            ActivityAction::FolderRenamed,
            identity,
            format!("{old_path} -> {new_path}"),
        )?;
        debug!(%old_path, %new_path, refiled, "folder renamed");
        Ok(())
    }

    fn delete_folder(&self, id: &FolderId, identity: &Identity) -> Result<(), StoreError> {
        let mut folders: Vec<FolderRecord> = self.load_file(FOLDERS_FILE)?;
        let index = folders
            .iter()
            .position(|record| &record.id == id)
            .ok_or_else(|| StoreError::FolderNotFound(id.to_string()))?;
        let target = folders[index].clone();

        let has_subfolders = folders.iter().any(|record| {
            record.id != target.id
                && same_group(record, &target)
                && record.path.starts_with(&target.path)
        });
        if has_subfolders {
            return Err(StoreError::FolderNotEmpty(target.path));
        }

        let documents: Vec<DocumentRecord> = self.load_file(DOCUMENTS_FILE)?;
        let has_documents = documents.iter().any(|document| {
            in_folder_scope(&target, document)
                && document
                    .folder_path
                    .as_deref()
                    .and_then(FolderPath::parse_opt)
                    .is_some_and(|path| path.starts_with(&target.path))
        });
        if has_documents {
            return Err(StoreError::FolderNotEmpty(target.path));
        }

        folders.remove(index);
        self.save_file(FOLDERS_FILE, &folders)?;
        self.record_activity(
            ActivityAction::FolderDeleted,
            identity,
            target.path.to_string(),
        )?;
        debug!(path = %target.path, "folder deleted");
        Ok(())
    }
}

impl DocumentStore for JsonVault {
    fn search(&self, query: &DocumentQuery) -> Result<Vec<DocumentRecord>, StoreError> {
        let mut documents: Vec<DocumentRecord> = self.load_file(DOCUMENTS_FILE)?;
        documents.retain(|record| {
            record.module == query.module
                && match &query.project_id {
                    Some(project) => record.project_id.as_ref() == Some(project),
                    None => true,
                }
        });
        if query.only_latest {
            documents = retain_latest(documents);
        }
        sort_documents(&mut documents, query.order_by, query.order_direction);
        Ok(documents)
    }

    fn add_document(
        &self,
        scope: &ModuleScope,
        draft: DocumentDraft,
        identity: &Identity,
    ) -> Result<DocumentRecord, StoreError> {
        let folder_path = match draft.folder_path.as_deref() {
            Some(raw) => Some(FolderPath::parse(raw)?.to_string()),
            None => None,
        };

        let mut documents: Vec<DocumentRecord> = self.load_file(DOCUMENTS_FILE)?;
        let version = documents
            .iter()
            .filter(|record| {
                record.module == scope.module
                    && record.file_name == draft.file_name
                    && record.project_id == scope.project_id
            })
            .map(|record| record.version)
            .max()
            .map_or(1, |latest| latest + 1);

        let record = DocumentRecord {
            id: DocumentId::generate(),
            file_name: draft.file_name,
            title: draft.title,
            description: draft.description,
            mime_type: draft.mime_type,
            size_bytes: draft.size_bytes,
            tags: draft.tags,
            version,
            uploaded_at_unix: current_timestamp(),
            uploaded_by: identity.clone(),
            module: scope.module,
            project_id: scope.project_id.clone(),
            folder_path,
        };

        documents.push(record.clone());
        self.save_file(DOCUMENTS_FILE, &documents)?;
        self.record_activity(
            ActivityAction::DocumentAdded,
            identity,
            format!("{} v{}", record.file_name, record.version),
        )?;
        debug!(file = %record.file_name, version = record.version, "document added");
        Ok(record)
    }

    fn move_documents(
        &self,
        ids: &[DocumentId],
        target: &FolderPath,
        identity: &Identity,
    ) -> Result<(), StoreError> {
        let mut documents: Vec<DocumentRecord> = self.load_file(DOCUMENTS_FILE)?;

        // Validate the whole batch before touching any record.
        let mut indices = Vec::with_capacity(ids.len());
        for id in ids {
            let index = documents
                .iter()
                .position(|record| &record.id == id)
                .ok_or_else(|| StoreError::DocumentNotFound(id.clone()))?;
            indices.push(index);
        }

        for index in &indices {
            documents[*index].folder_path = Some(target.to_string());
        }
        self.save_file(DOCUMENTS_FILE, &documents)?;
        self.record_activity(
            ActivityAction::DocumentsMoved,
            identity,
            format!("{} document(s) -> {target}", indices.len()),
        )?;
        debug!(count = indices.len(), %target, "documents moved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshelf_folders::EntityRef;
    use docshelf_records::ModuleKind;
    use tempfile::tempdir;

    fn actor() -> Identity {
        Identity::new("u1", "Alex")
    }

    fn scope() -> ModuleScope {
        ModuleScope::new(ModuleKind::Procurement)
    }

    #[test]
    fn missing_files_read_as_empty() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());
        assert!(vault.load_folders(&scope()).unwrap().is_empty());
        let query = DocumentQuery::new(ModuleKind::Procurement);
        assert!(vault.search(&query).unwrap().is_empty());
        assert!(vault.activity().unwrap().is_empty());
    }

    #[test]
    fn create_folder_persists_and_rejects_duplicates() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());

        let record = vault
            .create_folder(&scope(), FolderDraft::new("contracts"), &actor())
            .unwrap();
        assert_eq!(record.path.as_str(), "contracts");
        assert_eq!(record.created_by, actor());

        let err = vault
            .create_folder(&scope(), FolderDraft::new("contracts"), &actor())
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateFolder(_)));

        let folders = vault.load_folders(&scope()).unwrap();
        assert_eq!(folders.len(), 1);
    }

    #[test]
    fn create_folder_requires_existing_parent() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());
        let missing = FolderPath::parse("archive").unwrap();
        let err = vault
            .create_folder(
                &scope(),
                FolderDraft::new("2024").under(missing),
                &actor(),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::ParentNotFound(_)));
    }

    #[test]
    fn rename_cascades_to_descendants_and_documents() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());

        let root = vault
            .create_folder(&scope(), FolderDraft::new("drafts"), &actor())
            .unwrap();
        vault
            .create_folder(
                &scope(),
                FolderDraft::new("2024").under(root.path.clone()),
                &actor(),
            )
            .unwrap();
        vault
            .add_document(
                &scope(),
                DocumentDraft::new("quote.pdf", "application/pdf", 10).with_folder("drafts/2024"),
                &actor(),
            )
            .unwrap();

        vault.rename_folder(&root.id, "archive", &actor()).unwrap();

        let folders = vault.load_folders(&scope()).unwrap();
        let paths: Vec<_> = folders.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["archive", "archive/2024"]);

        let query = DocumentQuery::new(ModuleKind::Procurement);
        let documents = vault.search(&query).unwrap();
        assert_eq!(documents[0].folder_path.as_deref(), Some("archive/2024"));
    }

    #[test]
    fn rename_stays_inside_its_group() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());
        let acme = vault
            .create_folder(
                &scope(),
                FolderDraft::new("contracts").for_entity(EntityRef::new("vendors", "Acme")),
                &actor(),
            )
            .unwrap();
        let bolt = vault
            .create_folder(
                &scope(),
                FolderDraft::new("contracts").for_entity(EntityRef::new("vendors", "Bolt")),
                &actor(),
            )
            .unwrap();

        vault.rename_folder(&acme.id, "agreements", &actor()).unwrap();

        let folders = vault.load_folders(&scope()).unwrap();
        let renamed = folders.iter().find(|f| f.id == acme.id).unwrap();
        assert_eq!(renamed.path.as_str(), "agreements");
        let untouched = folders.iter().find(|f| f.id == bolt.id).unwrap();
        assert_eq!(untouched.path.as_str(), "contracts");
    }

    #[test]
    fn delete_checks_only_its_group() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());
        let acme = vault
            .create_folder(
                &scope(),
                FolderDraft::new("contracts").for_entity(EntityRef::new("vendors", "Acme")),
                &actor(),
            )
            .unwrap();
        let bolt = vault
            .create_folder(
                &scope(),
                FolderDraft::new("contracts").for_entity(EntityRef::new("vendors", "Bolt")),
                &actor(),
            )
            .unwrap();
        vault
            .create_folder(
                &scope(),
                FolderDraft::new("signed")
                    .under(bolt.path.clone())
                    .for_entity(EntityRef::new("vendors", "Bolt")),
                &actor(),
            )
            .unwrap();

        // Bolt's child must not block deleting Acme's empty folder.
        vault.delete_folder(&acme.id, &actor()).unwrap();
        let remaining = vault.load_folders(&scope()).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|f| f.id != acme.id));
    }

    #[test]
    fn rename_rejects_colliding_sibling() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());
        let first = vault
            .create_folder(&scope(), FolderDraft::new("alpha"), &actor())
            .unwrap();
        vault
            .create_folder(&scope(), FolderDraft::new("beta"), &actor())
            .unwrap();
        let err = vault.rename_folder(&first.id, "beta", &actor()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateFolder(_)));
    }

    #[test]
    fn delete_refuses_non_empty_folders() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());

        let parent = vault
            .create_folder(&scope(), FolderDraft::new("archive"), &actor())
            .unwrap();
        let child = vault
            .create_folder(
                &scope(),
                FolderDraft::new("2024").under(parent.path.clone()),
                &actor(),
            )
            .unwrap();
        let err = vault.delete_folder(&parent.id, &actor()).unwrap_err();
        assert!(matches!(err, StoreError::FolderNotEmpty(_)));

        vault
            .add_document(
                &scope(),
                DocumentDraft::new("a.pdf", "application/pdf", 1).with_folder("archive/2024"),
                &actor(),
            )
            .unwrap();
        let err = vault.delete_folder(&child.id, &actor()).unwrap_err();
        assert!(matches!(err, StoreError::FolderNotEmpty(_)));
    }

    #[test]
    fn delete_removes_empty_folder() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());
        let record = vault
            .create_folder(&scope(), FolderDraft::new("scratch"), &actor())
            .unwrap();
        vault.delete_folder(&record.id, &actor()).unwrap();
        assert!(vault.load_folders(&scope()).unwrap().is_empty());
        let err = vault.delete_folder(&record.id, &actor()).unwrap_err();
        assert!(matches!(err, StoreError::FolderNotFound(_)));
    }

    #[test]
    fn add_document_assigns_increasing_versions() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());
        let first = vault
            .add_document(
                &scope(),
                DocumentDraft::new("spec.pdf", "application/pdf", 10),
                &actor(),
            )
            .unwrap();
        let second = vault
            .add_document(
                &scope(),
                DocumentDraft::new("spec.pdf", "application/pdf", 12),
                &actor(),
            )
            .unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);

        let latest = vault
            .search(&DocumentQuery::new(ModuleKind::Procurement).only_latest(true))
            .unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].version, 2);
    }

    #[test]
    fn search_is_scoped_by_module() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());
        vault
            .add_document(
                &scope(),
                DocumentDraft::new("po.pdf", "application/pdf", 10),
                &actor(),
            )
            .unwrap();
        vault
            .add_document(
                &ModuleScope::new(ModuleKind::Hr),
                DocumentDraft::new("contract.pdf", "application/pdf", 10),
                &actor(),
            )
            .unwrap();

        let hits = vault.search(&DocumentQuery::new(ModuleKind::Procurement)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_name, "po.pdf");
    }

    #[test]
    fn move_validates_every_id_before_applying() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());
        let doc = vault
            .add_document(
                &scope(),
                DocumentDraft::new("a.pdf", "application/pdf", 1),
                &actor(),
            )
            .unwrap();
        let target = FolderPath::parse("archive").unwrap();
        let missing = DocumentId::from_string("nope");

        let err = vault
            .move_documents(&[doc.id.clone(), missing], &target, &actor())
            .unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound(_)));

        // The valid id stayed where it was.
        let documents = vault.search(&DocumentQuery::new(ModuleKind::Procurement)).unwrap();
        assert!(documents[0].folder_path.is_none());

        vault
            .move_documents(&[doc.id], &target, &actor())
            .unwrap();
        let documents = vault.search(&DocumentQuery::new(ModuleKind::Procurement)).unwrap();
        assert_eq!(documents[0].folder_path.as_deref(), Some("archive"));
    }

    #[test]
    fn mutations_append_to_activity_log() {
        let dir = tempdir().unwrap();
        let vault = JsonVault::new(dir.path());
        let folder = vault
            .create_folder(&scope(), FolderDraft::new("archive"), &actor())
            .unwrap();
        let doc = vault
            .add_document(
                &scope(),
                DocumentDraft::new("a.pdf", "application/pdf", 1),
                &actor(),
            )
            .unwrap();
        vault
            .move_documents(&[doc.id], &folder.path, &actor())
            .unwrap();

        let log = vault.activity().unwrap();
        let actions: Vec<_> = log.iter().map(|entry| entry.action).collect();
        assert_eq!(
            actions,
            [
                ActivityAction::FolderCreated,
                ActivityAction::DocumentAdded,
                ActivityAction::DocumentsMoved,
            ]
        );
        assert!(log.iter().all(|entry| entry.actor == actor()));
    }
}
