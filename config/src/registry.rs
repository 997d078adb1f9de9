use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use autocoder_types::ProjectId;

/// Registered projects and their root directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectRegistry {
    projects: BTreeMap<ProjectId, PathBuf>,
}

impl ProjectRegistry {
    /// Register or re-point `id`, returning the previous root.
    pub fn insert(&mut self, id: ProjectId, root: PathBuf) -> Option<PathBuf> {
        self.projects.insert(id, root)
    }

    #[must_use]
    pub fn project_path(&self, id: &ProjectId) -> Option<&Path> {
        self.projects.get(id).map(PathBuf::as_path)
    }

    #[must_use]
    pub fn contains(&self, id: &ProjectId) -> bool {
        self.projects.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProjectId, &Path)> {
        self.projects.iter().map(|(id, root)| (id, root.as_path()))
    }
}
