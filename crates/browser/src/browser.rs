use docshelf_folders::{
    breadcrumb_trail, build_folder_tree, BreadcrumbSegment, FolderDraft, FolderId, FolderNode,
    FolderPath, FolderRecord, ViewMode,
};
use docshelf_records::{
    DocumentFilter, DocumentId, DocumentMatcher, DocumentQuery, DocumentRecord, FilterError,
    Identity, ModuleScope,
};
use docshelf_store::{DocumentStore, FolderStore, StoreError};
use thiserror::Error;
use tracing::{debug, error};

use crate::selection::SelectionSet;

/// Errors returned from the browser's write paths.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Ticket for an in-flight folder tree load. Completing with a stale ticket
/// (one issued before a newer load began) discards the result.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a load ticket must be passed back to complete_tree_load"]
pub struct TreeLoadTicket {
    generation: u64,
}

/// Ticket for an in-flight document feed load.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a load ticket must be passed back to complete_documents_load"]
pub struct DocumentLoadTicket {
    generation: u64,
}

/// State coordinator for one mounted document browser view.
///
/// The folder tree and the document feed are loaded and staled independently.
/// On any read failure the previous snapshot is retained and a dismissible
/// error message is set; the display degrades to stale data, never to a
/// half-built one. Write failures are logged and returned to the caller so a
/// dialog can render them inline.
///
/// Each feed carries a load generation. Hosts that run loads asynchronously
/// use the split-phase [`begin_tree_load`](Self::begin_tree_load) /
/// [`complete_tree_load`](Self::complete_tree_load) pairs (and the document
/// equivalents); results completed against a superseded ticket are dropped,
/// so a slow early response can never clobber a newer one. The `reload_*`
/// helpers wrap the two phases around a direct store call.
#[derive(Debug)]
pub struct DocumentBrowser<F, D> {
    folder_store: F,
    document_store: D,
    scope: ModuleScope,
    view_mode: ViewMode,
    selected_path: Option<FolderPath>,
    only_latest: bool,
    tree: Vec<FolderNode>,
    documents: Vec<DocumentRecord>,
    filter: DocumentFilter,
    matcher: DocumentMatcher,
    selection: SelectionSet,
    error: Option<String>,
    loading_tree: bool,
    loading_documents: bool,
    tree_generation: u64,
    documents_generation: u64,
}

impl<F: FolderStore, D: DocumentStore> DocumentBrowser<F, D> {
    pub fn new(folder_store: F, document_store: D, scope: ModuleScope) -> Self {
        Self {
            folder_store,
            document_store,
            scope,
            view_mode: ViewMode::default(),
            selected_path: None,
            only_latest: true,
            tree: Vec::new(),
            documents: Vec::new(),
            filter: DocumentFilter::default(),
            matcher: DocumentMatcher::match_all(),
            selection: SelectionSet::new(),
            error: None,
            loading_tree: false,
            loading_documents: false,
            tree_generation: 0,
            documents_generation: 0,
        }
    }

    /// Initial mount: loads the tree and the document feed independently.
    pub fn init(&mut self) {
        self.reload_tree();
        self.reload_documents();
    }

    // --- snapshots -------------------------------------------------------

    pub fn scope(&self) -> &ModuleScope {
        &self.scope
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn selected_path(&self) -> Option<&FolderPath> {
        self.selected_path.as_ref()
    }

    pub fn tree(&self) -> &[FolderNode] {
        &self.tree
    }

    /// The unfiltered document feed as last loaded.
    ///
    /// The feed is module-scoped and flat: selecting a folder does not narrow
    /// it server-side. Folder-scoped queries are a known future improvement;
    /// until then folder placement is a navigation aid, not a filter.
    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    /// Documents matching the current filter, in feed order. Derived on
    /// demand; the underlying feed is never mutated.
    pub fn filtered_documents(&self) -> Vec<&DocumentRecord> {
        self.documents
            .iter()
            .filter(|record| self.matcher.matches(record))
            .collect()
    }

    pub fn filter(&self) -> &DocumentFilter {
        &self.filter
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn is_loading_tree(&self) -> bool {
        self.loading_tree
    }

    pub fn is_loading_documents(&self) -> bool {
        self.loading_documents
    }

    /// Breadcrumb trail for the current selection. Pure derivation, total
    /// over every reachable state.
    pub fn breadcrumbs(&self) -> Vec<BreadcrumbSegment> {
        breadcrumb_trail(self.selected_path.as_ref(), self.view_mode, self.scope.module)
    }

    // --- navigation ------------------------------------------------------

    /// Selects a folder (or clears the selection with `None`): the selection
    /// set is emptied and the document feed reloaded. The tree is untouched.
    pub fn select_folder(&mut self, path: Option<FolderPath>) {
        self.selected_path = path;
        self.selection.clear();
        self.reload_documents();
    }

    /// Switches the grouping mode, invalidating and reloading the tree.
    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        if self.view_mode == view_mode {
            return;
        }
        self.view_mode = view_mode;
        self.reload_tree();
    }

    /// Restricts the feed to the newest version of each file name (or shows
    /// every version), reloading the feed.
    pub fn set_only_latest(&mut self, only_latest: bool) {
        if self.only_latest == only_latest {
            return;
        }
        self.only_latest = only_latest;
        self.reload_documents();
    }

    // --- filtering and selection ----------------------------------------

    /// Replaces the filter. Compilation happens eagerly so an invalid regex
    /// surfaces here instead of on every keystroke of rendering.
    pub fn set_filter(&mut self, filter: DocumentFilter) -> Result<(), BrowserError> {
        self.matcher = filter.compile()?;
        self.filter = filter;
        Ok(())
    }

    /// Sets a plain substring filter; never fails.
    pub fn set_filter_query(&mut self, query: impl Into<String>) {
        let filter = DocumentFilter::plain(query);
        self.matcher = match filter.compile() {
            Ok(matcher) => matcher,
            // Plain filters cannot fail to compile.
            Err(_) => DocumentMatcher::match_all(),
        };
        self.filter = filter;
    }

    pub fn toggle_selected(&mut self, id: DocumentId) {
        self.selection.toggle(id);
    }

    /// Selects exactly the ids of the currently filtered list.
    pub fn select_all_filtered(&mut self) {
        let ids: Vec<DocumentId> = self
            .filtered_documents()
            .into_iter()
            .map(|record| record.id.clone())
            .collect();
        self.selection.select_all(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- loads -----------------------------------------------------------

    pub fn begin_tree_load(&mut self) -> TreeLoadTicket {
        self.tree_generation += 1;
        self.loading_tree = true;
        TreeLoadTicket {
            generation: self.tree_generation,
        }
    }

    pub fn complete_tree_load(
        &mut self,
        ticket: TreeLoadTicket,
        result: Result<Vec<FolderNode>, StoreError>,
    ) {
        if ticket.generation != self.tree_generation {
            debug!(
                stale = ticket.generation,
                current = self.tree_generation,
                "discarding stale tree load"
            );
            return;
        }
        self.loading_tree = false;
        match result {
            Ok(tree) => self.tree = tree,
            Err(err) => {
                error!(operation = "tree.load", module = %self.scope.module, error = %err, "folder tree load failed");
                self.error = Some(err.to_string());
            }
        }
    }

    /// Loads the folder records and rebuilds the tree in one synchronous
    /// round trip.
    pub fn reload_tree(&mut self) {
        let ticket = self.begin_tree_load();
        let result = self
            .folder_store
            .load_folders(&self.scope)
            .map(|records| build_folder_tree(&records, self.view_mode));
        self.complete_tree_load(ticket, result);
    }

    pub fn begin_documents_load(&mut self) -> DocumentLoadTicket {
        self.documents_generation += 1;
        self.loading_documents = true;
        DocumentLoadTicket {
            generation: self.documents_generation,
        }
    }

    pub fn complete_documents_load(
        &mut self,
        ticket: DocumentLoadTicket,
        result: Result<Vec<DocumentRecord>, StoreError>,
    ) {
        if ticket.generation != self.documents_generation {
            debug!(
                stale = ticket.generation,
                current = self.documents_generation,
                "discarding stale document load"
            );
            return;
        }
        self.loading_documents = false;
        match result {
            Ok(documents) => self.documents = documents,
            Err(err) => {
                error!(operation = "documents.load", module = %self.scope.module, error = %err, "document load failed");
                self.error = Some(err.to_string());
            }
        }
    }

    /// Query parameters the feed is loaded with.
    pub fn document_query(&self) -> DocumentQuery {
        DocumentQuery::for_scope(&self.scope).only_latest(self.only_latest)
    }

    pub fn reload_documents(&mut self) {
        let ticket = self.begin_documents_load();
        let result = self.document_store.search(&self.document_query());
        self.complete_documents_load(ticket, result);
    }

    // --- mutations -------------------------------------------------------

    /// Creates a folder, then fully reloads the tree. The error is returned
    /// (not only banner-surfaced) so a create dialog can stay open and show
    /// it inline.
    pub fn create_folder(
        &mut self,
        draft: FolderDraft,
        identity: &Identity,
    ) -> Result<FolderRecord, BrowserError> {
        let name = draft.name.clone();
        match self.folder_store.create_folder(&self.scope, draft, identity) {
            Ok(record) => {
                self.reload_tree();
                Ok(record)
            }
            Err(err) => {
                error!(operation = "folder.create", %name, error = %err, "folder create failed");
                Err(err.into())
            }
        }
    }

    pub fn rename_folder(
        &mut self,
        id: &FolderId,
        new_name: &str,
        identity: &Identity,
    ) -> Result<(), BrowserError> {
        match self.folder_store.rename_folder(id, new_name, identity) {
            Ok(()) => {
                self.reload_tree();
                // Documents filed under the folder carry the new path.
                self.reload_documents();
                Ok(())
            }
            Err(err) => {
                error!(operation = "folder.rename", folder = %id, error = %err, "folder rename failed");
                Err(err.into())
            }
        }
    }

    pub fn delete_folder(&mut self, id: &FolderId, identity: &Identity) -> Result<(), BrowserError> {
        match self.folder_store.delete_folder(id, identity) {
            Ok(()) => {
                self.reload_tree();
                Ok(())
            }
            Err(err) => {
                error!(operation = "folder.delete", folder = %id, error = %err, "folder delete failed");
                Err(err.into())
            }
        }
    }

    /// Moves documents to the target folder as one bulk operation (a
    /// one-element slice covers the single-document case). On success the
    /// selection is cleared and both feeds reload; on failure the selection
    /// is left intact so the action can be retried, the error banner is set,
    /// and the error is returned. An empty id list is a no-op.
    pub fn move_documents(
        &mut self,
        ids: &[DocumentId],
        target: &FolderPath,
        identity: &Identity,
    ) -> Result<(), BrowserError> {
        if ids.is_empty() {
            return Ok(());
        }
        match self.document_store.move_documents(ids, target, identity) {
            Ok(()) => {
                self.selection.clear();
                self.reload_tree();
                self.reload_documents();
                Ok(())
            }
            Err(err) => {
                error!(
                    operation = "documents.move",
                    count = ids.len(),
                    %target,
                    error = %err,
                    "document move failed"
                );
                self.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }
}
