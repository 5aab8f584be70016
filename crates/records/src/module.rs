use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::ProjectId;

/// Business module that owns a document space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleKind {
    Projects,
    Proposals,
    Procurement,
    Materials,
    Bom,
    Hr,
    Documents,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 7] = [
        ModuleKind::Projects,
        ModuleKind::Proposals,
        ModuleKind::Procurement,
        ModuleKind::Materials,
        ModuleKind::Bom,
        ModuleKind::Hr,
        ModuleKind::Documents,
    ];

    /// Uppercase display form used in headers and breadcrumbs.
    pub fn label(&self) -> &'static str {
        match self {
            ModuleKind::Projects => "PROJECTS",
            ModuleKind::Proposals => "PROPOSALS",
            ModuleKind::Procurement => "PROCUREMENT",
            ModuleKind::Materials => "MATERIALS",
            ModuleKind::Bom => "BOM",
            ModuleKind::Hr => "HR",
            ModuleKind::Documents => "DOCUMENTS",
        }
    }

    /// Lowercase path form used in navigation targets and storage keys.
    pub fn slug(&self) -> &'static str {
        match self {
            ModuleKind::Projects => "projects",
            ModuleKind::Proposals => "proposals",
            ModuleKind::Procurement => "procurement",
            ModuleKind::Materials => "materials",
            ModuleKind::Bom => "bom",
            ModuleKind::Hr => "hr",
            ModuleKind::Documents => "documents",
        }
    }

    /// Resolves a module from its slug, ignoring ASCII case.
    pub fn parse_slug(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|module| module.slug().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Module plus optional project restriction; every store read and mutation is
/// scoped by one of these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleScope {
    pub module: ModuleKind,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
}

impl ModuleScope {
    pub fn new(module: ModuleKind) -> Self {
        Self {
            module,
            project_id: None,
        }
    }

    pub fn with_project(module: ModuleKind, project_id: ProjectId) -> Self {
        Self {
            module,
            project_id: Some(project_id),
        }
    }

    /// True when a record tagged with `module`/`project_id` falls inside this
    /// scope. A scope without a project accepts every project.
    pub fn accepts(&self, module: ModuleKind, project_id: Option<&ProjectId>) -> bool {
        if module != self.module {
            return false;
        }
        match &self.project_id {
            Some(scoped) => project_id == Some(scoped),
            None => true,
        }
    }
}
