//! Project Directory
//!
//! Bidirectional name ↔ ID map plus the per-project loader handles.
//! Both directions are written while the name's shard is locked, so the two
//! maps never disagree.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::loader::{LoaderHandle, ProjectLoader};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_id: u32,
    pub project_name: String,
}

#[derive(Clone)]
struct ProjectSlot {
    id: u32,
    loader: LoaderHandle,
}

#[derive(Default)]
pub struct ProjectDirectory {
    by_name: DashMap<String, ProjectSlot>,
    by_id: DashMap<u32, String>,
}

impl ProjectDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` under an already known `id`.
    pub fn register(&self, name: &str, id: u32) -> Result<()> {
        self.register_with(name, || Ok(id)).map(|_| ())
    }

    /// Register `name`, asking `allocate` for an ID only once the name is
    /// known to be free. A rejected name consumes no ID, and a failed
    /// allocation leaves both maps untouched.
    pub fn register_with(
        &self,
        name: &str,
        allocate: impl FnOnce() -> Result<u32>,
    ) -> Result<u32> {
        let vacant = match self.by_name.entry(name.to_string()) {
            Entry::Occupied(_) => return Err(RegistryError::DuplicateProject(name.to_string())),
            Entry::Vacant(vacant) => vacant,
        };

        let id = allocate()?;
        match self.by_id.entry(id) {
            Entry::Occupied(_) => return Err(RegistryError::DuplicateProjectId(id)),
            Entry::Vacant(slot) => {
                slot.insert(name.to_string());
            }
        }

        vacant.insert(ProjectSlot {
            id,
            loader: ProjectLoader::new_handle(),
        });

        Ok(id)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn id_of(&self, name: &str) -> Result<u32> {
        self.by_name
            .get(name)
            .map(|slot| slot.id)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn name_of(&self, id: u32) -> Result<String> {
        self.by_id
            .get(&id)
            .map(|name| name.clone())
            .ok_or(RegistryError::UnknownProjectId(id))
    }

    pub fn handle_of(&self, name: &str) -> Result<LoaderHandle> {
        self.by_name
            .get(name)
            .map(|slot| slot.loader.clone())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// All projects, ordered by ID.
    pub fn records(&self) -> Vec<ProjectRecord> {
        let mut records: Vec<ProjectRecord> = self
            .by_name
            .iter()
            .map(|entry| ProjectRecord {
                project_id: entry.value().id,
                project_name: entry.key().clone(),
            })
            .collect();
        records.sort_by_key(|record| record.project_id);
        records
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoaderStatus;

    #[test]
    fn test_register_and_lookup() {
        let directory = ProjectDirectory::new();
        directory.register("cats", 1).unwrap();

        assert!(directory.is_registered("cats"));
        assert_eq!(directory.id_of("cats").unwrap(), 1);
        assert_eq!(directory.name_of(1).unwrap(), "cats");
        assert_eq!(
            directory.handle_of("cats").unwrap().lock().status(),
            LoaderStatus::Unset
        );
    }

    #[test]
    fn test_missing_project() {
        let directory = ProjectDirectory::new();
        assert_eq!(
            directory.id_of("ghost"),
            Err(RegistryError::NotFound("ghost".to_string()))
        );
        assert!(directory.handle_of("ghost").is_err());
        assert_eq!(directory.name_of(9), Err(RegistryError::UnknownProjectId(9)));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let directory = ProjectDirectory::new();
        directory.register("cats", 1).unwrap();

        let mut allocated = false;
        let err = directory
            .register_with("cats", || {
                allocated = true;
                Ok(2)
            })
            .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateProject("cats".to_string()));
        assert!(!allocated);
        assert_eq!(directory.id_of("cats").unwrap(), 1);
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let directory = ProjectDirectory::new();
        directory.register("cats", 1).unwrap();

        assert_eq!(
            directory.register("dogs", 1),
            Err(RegistryError::DuplicateProjectId(1))
        );
        assert!(!directory.is_registered("dogs"));
        assert_eq!(directory.name_of(1).unwrap(), "cats");
    }

    #[test]
    fn test_failed_allocation_registers_nothing() {
        let directory = ProjectDirectory::new();

        assert_eq!(
            directory.register_with("cats", || Err(RegistryError::IdsExhausted)),
            Err(RegistryError::IdsExhausted)
        );
        assert!(!directory.is_registered("cats"));
        assert!(directory.is_empty());
    }

    #[test]
    fn test_records_sorted_by_id() {
        let directory = ProjectDirectory::new();
        directory.register("b", 2).unwrap();
        directory.register("a", 3).unwrap();
        directory.register("c", 1).unwrap();

        let ids: Vec<u32> = directory.records().iter().map(|r| r.project_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
