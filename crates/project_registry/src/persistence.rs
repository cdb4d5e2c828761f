//! Persistence Store seam
//!
//! The registry never touches storage itself. Hosts plug a store in here to
//! reseed IDs at startup and to record loaded item UUIDs.

use anyhow::Result;
use dashmap::DashMap;
use uuid::Uuid;

pub trait PersistenceStore: Send + Sync {
    /// IDs of every project already persisted.
    fn load_all_project_ids(&self) -> Result<Vec<u32>>;

    /// Record the UUIDs loaded so far for `project_name`.
    fn persist_progress(&self, project_name: &str, uuids: &[Uuid]) -> Result<()>;
}

/// Store that keeps everything in memory for the life of the process.
#[derive(Default)]
pub struct InMemoryStore {
    project_ids: DashMap<u32, String>,
    progress: DashMap<String, Vec<Uuid>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store with projects from a previous run.
    pub fn with_projects<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        let store = Self::new();
        for (id, name) in projects {
            store.project_ids.insert(id, name.into());
        }
        store
    }

    pub fn persisted(&self, project_name: &str) -> Option<Vec<Uuid>> {
        self.progress.get(project_name).map(|v| v.clone())
    }
}

impl PersistenceStore for InMemoryStore {
    fn load_all_project_ids(&self) -> Result<Vec<u32>> {
        let mut ids: Vec<u32> = self.project_ids.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn persist_progress(&self, project_name: &str, uuids: &[Uuid]) -> Result<()> {
        self.progress.insert(project_name.to_string(), uuids.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_store() {
        let store = InMemoryStore::with_projects([(3, "cats"), (1, "dogs")]);
        assert_eq!(store.load_all_project_ids().unwrap(), vec![1, 3]);

        let uuids = vec![Uuid::new_v4(), Uuid::new_v4()];
        store.persist_progress("cats", &uuids).unwrap();
        assert_eq!(store.persisted("cats"), Some(uuids));
        assert_eq!(store.persisted("dogs"), None);
    }
}
