use std::collections::BTreeSet;

use docshelf_records::DocumentId;

/// Set of checked document rows. Lives only in UI state; mutating actions and
/// navigation clear it. All operations are synchronous, local, and idempotent
/// under repeated identical calls.
///
/// Membership is not tied to the visible list: selecting and then narrowing
/// the filter can leave ids in here that no longer appear on screen. They
/// stay until the selection is cleared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<DocumentId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of one id.
    pub fn toggle(&mut self, id: DocumentId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Replaces the selection with exactly the given ids.
    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = DocumentId>,
    {
        self.ids = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &DocumentId> {
        self.ids.iter()
    }

    /// Snapshot of the selected ids, in stable order.
    pub fn to_vec(&self) -> Vec<DocumentId> {
        self.ids.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> DocumentId {
        DocumentId::from_string(value)
    }

    #[test]
    fn toggle_twice_restores_original_membership() {
        let mut selection = SelectionSet::new();
        selection.toggle(id("doc1"));
        let before = selection.clone();
        selection.toggle(id("doc2"));
        selection.toggle(id("doc2"));
        assert_eq!(selection, before);
    }

    #[test]
    fn select_all_replaces_rather_than_extends() {
        let mut selection = SelectionSet::new();
        selection.toggle(id("stale"));
        selection.select_all([id("a"), id("b")]);
        assert_eq!(selection.len(), 2);
        assert!(!selection.contains(&id("stale")));
    }

    #[test]
    fn select_all_then_clear_is_always_empty() {
        let mut selection = SelectionSet::new();
        selection.select_all([id("a"), id("b"), id("c")]);
        selection.clear();
        assert!(selection.is_empty());
        selection.clear();
        assert!(selection.is_empty());
    }
}
