//! The orchestrating coordinator behind the document browser view.
//!
//! [`DocumentBrowser`] composes the folder tree, the document feed, the text
//! filter, and the selection set into one state object for a presentation
//! layer to bind against. It owns its snapshots exclusively: mutations always
//! go through the store first and are followed by a fresh read, never by a
//! local optimistic edit.

mod browser;
mod selection;

pub use browser::{BrowserError, DocumentBrowser, DocumentLoadTicket, TreeLoadTicket};
pub use selection::SelectionSet;
