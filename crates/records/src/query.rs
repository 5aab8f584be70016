use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::module::{ModuleKind, ModuleScope};
use crate::record::{DocumentRecord, ProjectId};

/// Sort key for server-side document listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    UploadedAt,
    FileName,
    Size,
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::UploadedAt
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl Default for OrderDirection {
    fn default() -> Self {
        Self::Descending
    }
}

/// Parameters for a document search against the store.
///
/// The feed is module-scoped only: there is intentionally no folder parameter
/// here, so a listing always returns the module's full document set and folder
/// placement is a client-side concern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentQuery {
    pub module: ModuleKind,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub only_latest: bool,
    #[serde(default)]
    pub order_by: OrderBy,
    #[serde(default)]
    pub order_direction: OrderDirection,
}

impl DocumentQuery {
    /// Newest-first listing of every document in the module, all versions.
    pub fn new(module: ModuleKind) -> Self {
        Self {
            module,
            project_id: None,
            only_latest: false,
            order_by: OrderBy::default(),
            order_direction: OrderDirection::default(),
        }
    }

    pub fn for_scope(scope: &ModuleScope) -> Self {
        let mut query = Self::new(scope.module);
        query.project_id = scope.project_id.clone();
        query
    }

    pub fn only_latest(mut self, only_latest: bool) -> Self {
        self.only_latest = only_latest;
        self
    }

    pub fn ordered(mut self, order_by: OrderBy, order_direction: OrderDirection) -> Self {
        self.order_by = order_by;
        self.order_direction = order_direction;
        self
    }
}

/// Sorts records in place by the requested key. Ties keep their previous
/// relative order.
pub fn sort_documents(records: &mut [DocumentRecord], order_by: OrderBy, direction: OrderDirection) {
    records.sort_by(|a, b| {
        let ordering = match order_by {
            OrderBy::UploadedAt => a.uploaded_at_unix.cmp(&b.uploaded_at_unix),
            OrderBy::FileName => a
                .file_name
                .to_lowercase()
                .cmp(&b.file_name.to_lowercase()),
            OrderBy::Size => a.size_bytes.cmp(&b.size_bytes),
        };
        match direction {
            OrderDirection::Ascending => ordering,
            OrderDirection::Descending => ordering.reverse(),
        }
    });
}

/// Keeps, for each file name, only the record with the highest version.
/// Surviving records retain their relative order.
pub fn retain_latest(records: Vec<DocumentRecord>) -> Vec<DocumentRecord> {
    let mut newest: HashMap<String, u32> = HashMap::new();
    for record in &records {
        let entry = newest.entry(record.file_name.clone()).or_insert(record.version);
        if record.version > *entry {
            *entry = record.version;
        }
    }
    records
        .into_iter()
        .filter(|record| newest.get(&record.file_name) == Some(&record.version))
        .collect()
}
