use docshelf_records::ModuleKind;

use crate::path::FolderPath;
use crate::tree::ViewMode;

/// Category of a breadcrumb segment, used by the presentation layer purely
/// for icon selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreadcrumbKind {
    Module,
    Project,
    EntityType,
    Entity,
    Folder,
}

/// One segment of the navigation trail. `path` is the navigation target
/// route: the module slug followed by the folder path up to this segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreadcrumbSegment {
    pub label: String,
    pub path: String,
    pub kind: BreadcrumbKind,
    pub navigable: bool,
}

/// Derives the breadcrumb trail for the current selection.
///
/// Total over every reachable selection: `None` yields the single module
/// segment. The trail is never empty, every prior segment carries a distinct
/// navigable path, and the final segment (the current location) is marked
/// non-navigable. Segment kinds are assigned positionally from the view mode:
/// entity view reads `<entity type>/<entity>/<folder>...`, project view
/// `<project>/<folder>...`.
pub fn breadcrumb_trail(
    selected: Option<&FolderPath>,
    view_mode: ViewMode,
    module: ModuleKind,
) -> Vec<BreadcrumbSegment> {
    let mut trail = vec![BreadcrumbSegment {
        label: module.label().to_string(),
        path: module.slug().to_string(),
        kind: BreadcrumbKind::Module,
        navigable: true,
    }];

    if let Some(path) = selected {
        let mut route = module.slug().to_string();
        for (index, segment) in path.segments().enumerate() {
            route.push('/');
            route.push_str(segment);
            trail.push(BreadcrumbSegment {
                label: segment.to_string(),
                path: route.clone(),
                kind: segment_kind(view_mode, index),
                navigable: true,
            });
        }
    }

    if let Some(last) = trail.last_mut() {
        last.navigable = false;
    }
    trail
}

fn segment_kind(view_mode: ViewMode, index: usize) -> BreadcrumbKind {
    match (view_mode, index) {
        (ViewMode::Entity, 0) => BreadcrumbKind::EntityType,
        (ViewMode::Entity, 1) => BreadcrumbKind::Entity,
        (ViewMode::Project, 0) => BreadcrumbKind::Project,
        _ => BreadcrumbKind::Folder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_selection_yields_single_module_segment() {
        let trail = breadcrumb_trail(None, ViewMode::Entity, ModuleKind::Procurement);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].label, "PROCUREMENT");
        assert_eq!(trail[0].path, "procurement");
        assert_eq!(trail[0].kind, BreadcrumbKind::Module);
        assert!(!trail[0].navigable);
    }

    #[test]
    fn blank_path_normalizes_to_module_segment() {
        // A blank selection string parses to no selection at all.
        let selected = FolderPath::parse_opt("   ");
        let trail = breadcrumb_trail(selected.as_ref(), ViewMode::Project, ModuleKind::Hr);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].path, "hr");
    }

    #[test]
    fn entity_view_assigns_kinds_positionally() {
        let path = FolderPath::parse("vendors/Acme/contracts/2024").unwrap();
        let trail = breadcrumb_trail(Some(&path), ViewMode::Entity, ModuleKind::Procurement);
        let kinds: Vec<_> = trail.iter().map(|segment| segment.kind).collect();
        assert_eq!(
            kinds,
            [
                BreadcrumbKind::Module,
                BreadcrumbKind::EntityType,
                BreadcrumbKind::Entity,
                BreadcrumbKind::Folder,
                BreadcrumbKind::Folder,
            ]
        );
        assert_eq!(trail[2].path, "procurement/vendors/Acme");
        assert!(trail[3].navigable);
        assert!(!trail[4].navigable);
    }

    #[test]
    fn project_view_marks_first_segment_as_project() {
        let path = FolderPath::parse("Harbour Works/drawings").unwrap();
        let trail = breadcrumb_trail(Some(&path), ViewMode::Project, ModuleKind::Projects);
        assert_eq!(trail[1].kind, BreadcrumbKind::Project);
        assert_eq!(trail[2].kind, BreadcrumbKind::Folder);
        assert_eq!(trail[2].path, "projects/Harbour Works/drawings");
    }

    #[test]
    fn prior_segments_carry_distinct_paths() {
        let path = FolderPath::parse("a/b/c").unwrap();
        let trail = breadcrumb_trail(Some(&path), ViewMode::Entity, ModuleKind::Documents);
        let mut paths: Vec<_> = trail.iter().map(|segment| segment.path.clone()).collect();
        let before = paths.len();
        paths.dedup();
        assert_eq!(paths.len(), before);
    }
}
