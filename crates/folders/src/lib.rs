//! Folder navigation primitives for DocShelf: normalized folder paths, flat
//! folder records, the hierarchy builder, and breadcrumb derivation.
//!
//! Folders exist purely for navigation. Documents are not stored under them;
//! a folder path on a document is an association, not a storage key.

mod breadcrumb;
mod path;
mod record;
mod tree;

pub use breadcrumb::{breadcrumb_trail, BreadcrumbKind, BreadcrumbSegment};
pub use path::{validate_folder_name, FolderPath, FolderPathError};
pub use record::{EntityRef, FolderDraft, FolderId, FolderRecord};
pub use tree::{build_folder_tree, find_node, FolderNode, ViewMode};
