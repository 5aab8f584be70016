//! Document metadata primitives shared across the DocShelf workspace.
//!
//! This crate owns the vocabulary of the document space: the business module
//! enumeration, record and project identifiers, the `DocumentRecord` metadata
//! type, server-side query parameters, and the client-side text filter applied
//! on top of a fetched document list.

mod filter;
mod identity;
mod module;
mod query;
mod record;

pub use filter::{DocumentFilter, DocumentMatcher, FilterError, FilterMode};
pub use identity::Identity;
pub use module::{ModuleKind, ModuleScope};
pub use query::{retain_latest, sort_documents, DocumentQuery, OrderBy, OrderDirection};
pub use record::{DocumentDraft, DocumentId, DocumentRecord, ProjectId, ProjectRef};
