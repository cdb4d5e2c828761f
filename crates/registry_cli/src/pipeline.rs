//! One select → focus → load → finish cycle against the registry.

use anyhow::{Context, Result};
use project_registry::{LoaderStatus, PersistenceStore, Progress, ProjectRegistry};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::walker;

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub project_name: String,
    pub project_id: u32,
    pub status: LoaderStatus,
    pub progress: Progress,
    pub item_uuids: Vec<Uuid>,
}

/// Restore persisted projects into the registry and reseed its allocator.
pub fn restore(config: &Config, registry: &ProjectRegistry, store: &dyn PersistenceStore) -> Result<()> {
    for record in &config.known_projects {
        if !registry.is_registered(&record.project_name) {
            registry.register(&record.project_name, record.project_id)?;
        }
    }

    let seed = registry
        .restore_ids(store)
        .context("Failed to read persisted project ids")?;
    info!(seed, projects = registry.projects().len(), "Registry restored");

    Ok(())
}

pub async fn run(
    config: &Config,
    registry: &ProjectRegistry,
    store: &dyn PersistenceStore,
) -> Result<LoadReport> {
    let name = config.project_name.as_str();

    let project_id = if registry.is_registered(name) {
        registry.id_of(name)?
    } else {
        registry.register_project(name)?
    };

    registry.open(config.selection_kind)?;

    // The window stays ours until the load takes over
    let items = match select_items(config, registry).await {
        Ok(items) => items,
        Err(e) => {
            registry.picker_close();
            return Err(e);
        }
    };

    let mut progress_rx = registry.subscribe(name)?;
    let watch_name = name.to_string();
    let watcher = tokio::spawn(async move {
        while progress_rx.changed().await.is_ok() {
            let progress = *progress_rx.borrow_and_update();
            debug!(
                project = %watch_name,
                current = progress.current,
                total = progress.total,
                percent = progress.percent(),
                "Load progress"
            );
            if progress.is_complete() {
                break;
            }
        }
    });

    let outcome = load_items(registry, store, name, &items);
    watcher.abort();

    let (status, uuids) = match outcome {
        Ok(loaded) => loaded,
        Err(e) => {
            if let Err(abort_err) = registry.abort_load(name) {
                warn!(project = %name, error = %abort_err, "Failed to abort load");
            }
            return Err(e);
        }
    };

    Ok(LoadReport {
        project_name: name.to_string(),
        project_id,
        status,
        progress: registry.progress(name)?,
        item_uuids: uuids,
    })
}

/// Focus the project, scan the selection and start the load.
async fn select_items(config: &Config, registry: &ProjectRegistry) -> Result<Vec<PathBuf>> {
    registry.focus_project(&config.project_name)?;

    let selection = config.selection_path();
    let kind = config.selection_kind;
    let extensions = config.allowed_extensions.clone();
    let items = tokio::task::spawn_blocking(move || walker::collect_items(&selection, kind, &extensions))
        .await
        .context("Selection scan panicked")??;

    let expected = u32::try_from(items.len()).context("Too many items in selection")?;
    registry.begin_load_for_focused(expected)?;

    Ok(items)
}

fn load_items(
    registry: &ProjectRegistry,
    store: &dyn PersistenceStore,
    name: &str,
    items: &[PathBuf],
) -> Result<(LoaderStatus, Vec<Uuid>)> {
    let mut uuids = Vec::with_capacity(items.len());
    for item in items {
        uuids.push(Uuid::new_v4());
        registry.advance_load(name)?;
        store
            .persist_progress(name, &uuids)
            .with_context(|| format!("Failed to persist progress for {}", item.display()))?;
    }

    registry.set_sanity_list(name, uuids.clone())?;
    let status = registry.finish_from_sanity(name)?;

    Ok((status, uuids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use project_registry::{InMemoryStore, ProjectRecord, SelectionKind};
    use std::fs;

    fn config_for(root: &std::path::Path, project: &str) -> Config {
        Config {
            root_search_path: root.to_path_buf(),
            project_name: project.to_string(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_folder_load() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.jpg", "skip.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let config = config_for(dir.path(), "cats");
        let registry = ProjectRegistry::new(dir.path());
        let store = InMemoryStore::new();

        let report = run(&config, &registry, &store).await.unwrap();

        assert_eq!(report.project_id, 1);
        assert_eq!(report.status, LoaderStatus::Loaded);
        assert_eq!(report.progress.as_pair(), (2, 2));
        assert_eq!(store.persisted("cats"), Some(report.item_uuids.clone()));
        assert!(registry.picker_available());
    }

    #[tokio::test]
    async fn test_empty_folder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), "blank");
        let registry = ProjectRegistry::new(dir.path());

        let report = run(&config, &registry, &InMemoryStore::new()).await.unwrap();

        assert_eq!(report.status, LoaderStatus::Empty);
        assert_eq!(report.progress.as_pair(), (0, 1));
    }

    #[tokio::test]
    async fn test_bad_selection_releases_picker() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path(), "cats");
        config.selection_kind = SelectionKind::File;

        let registry = ProjectRegistry::new(dir.path());
        assert!(run(&config, &registry, &InMemoryStore::new()).await.is_err());
        assert!(registry.picker_available());
    }

    struct FailingStore;

    impl PersistenceStore for FailingStore {
        fn load_all_project_ids(&self) -> anyhow::Result<Vec<u32>> {
            Ok(Vec::new())
        }

        fn persist_progress(&self, _project_name: &str, _uuids: &[Uuid]) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[tokio::test]
    async fn test_failed_persist_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"").unwrap();
        let registry = ProjectRegistry::new(dir.path());

        let err = run(&config_for(dir.path(), "cats"), &registry, &FailingStore)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("disk full"));

        assert_eq!(registry.status_of("cats").unwrap(), LoaderStatus::Unset);
        assert!(registry.picker_available());
        let session = registry.session();
        assert!(!session.is_processing);
        assert_eq!(session.focused_project_name, "");

        registry.register_project("dogs").unwrap();
        registry.begin_load("dogs", 1).unwrap();
        registry.finish_load("dogs", true).unwrap();

        let report = run(&config_for(dir.path(), "birds"), &registry, &InMemoryStore::new())
            .await
            .unwrap();
        assert_eq!(report.status, LoaderStatus::Loaded);
    }

    #[test]
    fn test_restore_reseeds() {
        let mut config = Config::default();
        config.known_projects = vec![ProjectRecord {
            project_id: 5,
            project_name: "old".to_string(),
        }];
        let store = InMemoryStore::with_projects([(5, "old")]);
        let registry = ProjectRegistry::new(".");

        restore(&config, &registry, &store).unwrap();

        assert_eq!(registry.id_of("old").unwrap(), 5);
        assert_eq!(registry.register_project("new").unwrap(), 6);
    }
}
