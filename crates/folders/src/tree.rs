use serde::{Deserialize, Serialize};

use crate::path::FolderPath;
use crate::record::FolderRecord;

/// Controls how the folder tree is grouped. Switching modes invalidates the
/// tree; it must be rebuilt, not patched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Entity,
    Project,
}

impl Default for ViewMode {
    fn default() -> Self {
        Self::Entity
    }
}

/// One folder in the derived hierarchy. Consumers hold the tree as a
/// read-only snapshot replaced wholesale on every reload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    pub name: String,
    pub path: FolderPath,
    #[serde(default)]
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// Locates a node by path within this subtree.
    pub fn find(&self, path: &FolderPath) -> Option<&FolderNode> {
        if &self.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.children.iter().find_map(|child| child.find(path))
    }
}

/// Locates a node by path across a forest of root nodes.
pub fn find_node<'a>(nodes: &'a [FolderNode], path: &FolderPath) -> Option<&'a FolderNode> {
    nodes.iter().find_map(|node| node.find(path))
}

/// Builds the navigation hierarchy from flat folder records.
///
/// Entity view groups records under synthetic `<entity kind>/<entity label>`
/// roots; project view groups them under the project name. Records without a
/// grouping key sit at the top level. Intermediate nodes are created for any
/// ancestor path that has no record of its own, children are sorted by name,
/// and the result is rebuilt from scratch on every call.
pub fn build_folder_tree(records: &[FolderRecord], view_mode: ViewMode) -> Vec<FolderNode> {
    let mut roots = Vec::new();
    for record in records {
        let mut segments = grouping_prefix(record, view_mode);
        segments.extend(record.path.segments().map(str::to_string));
        insert_segments(&mut roots, None, &segments);
    }
    sort_recursive(&mut roots);
    roots
}

fn grouping_prefix(record: &FolderRecord, view_mode: ViewMode) -> Vec<String> {
    let raw = match view_mode {
        ViewMode::Entity => match &record.entity {
            Some(entity) => vec![entity.kind.clone(), entity.label.clone()],
            None => Vec::new(),
        },
        ViewMode::Project => match &record.project {
            Some(project) => vec![project.name.clone()],
            None => Vec::new(),
        },
    };
    raw.into_iter()
        .map(|segment| segment.trim().replace('/', "-"))
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn insert_segments(nodes: &mut Vec<FolderNode>, prefix: Option<&FolderPath>, segments: &[String]) {
    let (head, rest) = match segments.split_first() {
        Some(split) => split,
        None => return,
    };
    let path = match prefix {
        Some(prefix) => FolderPath::from_normalized(format!("{}/{head}", prefix.as_str())),
        None => FolderPath::from_normalized(head.clone()),
    };
    let index = match nodes.iter().position(|node| node.path == path) {
        Some(index) => index,
        None => {
            nodes.push(FolderNode {
                name: head.clone(),
                path: path.clone(),
                children: Vec::new(),
            });
            nodes.len() - 1
        }
    };
    insert_segments(&mut nodes[index].children, Some(&path), rest);
}

fn sort_recursive(nodes: &mut [FolderNode]) {
    nodes.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    for node in nodes.iter_mut() {
        sort_recursive(&mut node.children);
    }
}
