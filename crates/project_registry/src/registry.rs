//! Project Registry
//!
//! Facade over the allocator, directory, loader state machines and the
//! selection session. Cheap to clone; every clone shares the same state.
//!
//! Lock order is always session, then loader. Reads of a single project
//! (`progress`, `status_of`) take only that project's loader lock.

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::allocator::ProjectIdAllocator;
use crate::directory::{ProjectDirectory, ProjectRecord};
use crate::error::{RegistryError, Result};
use crate::loader::{LoaderHandle, LoaderStatus, Progress};
use crate::persistence::PersistenceStore;
use crate::session::{SelectionKind, SelectionSession, SelectorStatus, SessionSnapshot};

#[derive(Clone)]
pub struct ProjectRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    allocator: ProjectIdAllocator,
    directory: ProjectDirectory,
    session: Mutex<SelectionSession>,
}

static GLOBAL_REGISTRY: OnceLock<ProjectRegistry> = OnceLock::new();

impl ProjectRegistry {
    /// Create a registry whose pickers start at `root_search_path`.
    pub fn new(root_search_path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                allocator: ProjectIdAllocator::new(),
                directory: ProjectDirectory::new(),
                session: Mutex::new(SelectionSession::new(root_search_path.into())),
            }),
        }
    }

    /// Install as the process-wide instance. Returns false if one was
    /// already installed.
    pub fn set_global(self) -> bool {
        GLOBAL_REGISTRY.set(self).is_ok()
    }

    /// Get the process-wide instance, if one was installed
    pub fn global() -> Option<&'static Self> {
        GLOBAL_REGISTRY.get()
    }

    // ---- IDs ----

    /// Allocate a project ID without registering anything
    pub fn next_project_id(&self) -> Result<u32> {
        self.inner.allocator.next()
    }

    /// Make the next allocated ID `seed + 1`
    pub fn reseed(&self, seed: u32) {
        self.inner.allocator.reseed(seed);
        info!(seed, "Project id allocator reseeded");
    }

    /// Reseed from the highest persisted project ID (0 when none).
    pub fn restore_ids(&self, store: &dyn PersistenceStore) -> anyhow::Result<u32> {
        let seed = store.load_all_project_ids()?.into_iter().max().unwrap_or(0);
        self.reseed(seed);
        Ok(seed)
    }

    // ---- Directory ----

    /// Register a new project and hand back its freshly allocated ID.
    pub fn register_project(&self, name: &str) -> Result<u32> {
        let allocator = &self.inner.allocator;
        let id = self
            .inner
            .directory
            .register_with(name, || allocator.next())
            .inspect_err(|e| warn!(project = %name, error = %e, "Project registration rejected"))?;

        info!(project = %name, project_id = id, "Project registered");
        Ok(id)
    }

    /// Register a project whose ID is already known (e.g. from storage).
    pub fn register(&self, name: &str, id: u32) -> Result<()> {
        self.inner
            .directory
            .register(name, id)
            .inspect_err(|e| warn!(project = %name, error = %e, "Project registration rejected"))?;

        info!(project = %name, project_id = id, "Project registered");
        Ok(())
    }

    /// Check whether `name` exists in this session
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.directory.is_registered(name)
    }

    /// Get the ID of `name`
    pub fn id_of(&self, name: &str) -> Result<u32> {
        self.inner.directory.id_of(name)
    }

    /// Get the project name registered under `id`
    pub fn name_of(&self, id: u32) -> Result<String> {
        self.inner.directory.name_of(id)
    }

    /// Get the loader handle of `name`
    pub fn handle_of(&self, name: &str) -> Result<LoaderHandle> {
        self.inner.directory.handle_of(name)
    }

    /// List all projects, ordered by ID
    pub fn projects(&self) -> Vec<ProjectRecord> {
        self.inner.directory.records()
    }

    // ---- Picker ----

    /// Open the picker from a front-end string (`"file"` / `"folder"`).
    pub fn picker_open(&self, kind: &str) -> Result<()> {
        self.open(kind.parse()?)
    }

    /// Open the picker, failing if a window or a load holds it
    pub fn open(&self, kind: SelectionKind) -> Result<()> {
        self.inner.session.lock().open(kind)?;
        info!(kind = %kind, "Selection window opened");
        Ok(())
    }

    /// Close the picker window
    pub fn picker_close(&self) {
        self.inner.session.lock().close();
        info!("Selection window closed");
    }

    /// Check that no window is open and no load is processing
    pub fn picker_available(&self) -> bool {
        self.inner.session.lock().is_picker_available()
    }

    /// Get the current selector phase
    pub fn selector_status(&self) -> SelectorStatus {
        self.inner.session.lock().selector_status()
    }

    /// Snapshot the selection session
    pub fn session(&self) -> SessionSnapshot {
        self.inner.session.lock().snapshot()
    }

    /// Get the root search path
    pub fn root_search_path(&self) -> PathBuf {
        self.inner.session.lock().root_search_path().clone()
    }

    // ---- Focus ----

    /// Focus `name` for the operations that take no project argument
    pub fn focus_project(&self, name: &str) -> Result<()> {
        if !self.inner.directory.is_registered(name) {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        self.inner.session.lock().focus(name);
        debug!(project = %name, "Project focused");
        Ok(())
    }

    /// Get the focused project name
    pub fn focused_project(&self) -> Option<String> {
        self.inner.session.lock().focused_project().map(str::to_string)
    }

    /// Get the focused project's ID
    pub fn focused_id(&self) -> Result<u32> {
        let name = self.focused_or_err()?;
        self.id_of(&name)
    }

    /// Get the focused project's progress
    pub fn focused_progress(&self) -> Result<Progress> {
        let name = self.focused_or_err()?;
        self.progress(&name)
    }

    fn focused_or_err(&self) -> Result<String> {
        self.focused_project().ok_or(RegistryError::NoFocus)
    }

    // ---- Loading ----

    /// Start (or restart) loading `name` with `expected_count` items.
    /// Supersedes an open picker window.
    pub fn begin_load(&self, name: &str, expected_count: u32) -> Result<()> {
        let handle = self.handle_of(name)?;

        let mut session = self.inner.session.lock();
        session.check_can_load(name)?;

        let mut loader = handle.lock();
        loader.start(expected_count);
        session.begin_processing(name);

        info!(
            project = %name,
            total = loader.progress().total,
            "Project load started"
        );
        Ok(())
    }

    /// Start loading the focused project
    pub fn begin_load_for_focused(&self, expected_count: u32) -> Result<()> {
        let name = self.focused_or_err()?;
        self.begin_load(&name, expected_count)
    }

    /// Count one processed item and return the updated progress.
    pub fn advance_load(&self, name: &str) -> Result<Progress> {
        let handle = self.handle_of(name)?;

        let mut session = self.inner.session.lock();
        let progress = handle.lock().advance(name)?;
        session.mark_updating(name);

        debug!(
            project = %name,
            current = progress.current,
            total = progress.total,
            "Project load advanced"
        );
        Ok(progress)
    }

    /// Finish loading `name` as `Empty` or `Loaded`
    pub fn finish_load(&self, name: &str, is_empty: bool) -> Result<LoaderStatus> {
        let handle = self.handle_of(name)?;

        let mut session = self.inner.session.lock();
        let status = handle.lock().finish(name, is_empty)?;
        session.end_processing();

        info!(project = %name, status = %status, "Project load finished");
        Ok(status)
    }

    /// Finish loading the focused project
    pub fn finish_focused(&self, is_empty: bool) -> Result<LoaderStatus> {
        let name = self.focused_or_err()?;
        self.finish_load(&name, is_empty)
    }

    /// Give up on a load of `name` that cannot complete. The loader returns
    /// to `Unset` and the picker becomes available again.
    pub fn abort_load(&self, name: &str) -> Result<()> {
        let handle = self.handle_of(name)?;

        let mut session = self.inner.session.lock();
        handle.lock().abort(name)?;
        session.abort_processing();

        warn!(project = %name, "Project load aborted");
        Ok(())
    }

    /// Finish `name`, deciding `Empty` vs `Loaded` from its sanity list.
    pub fn finish_from_sanity(&self, name: &str) -> Result<LoaderStatus> {
        let handle = self.handle_of(name)?;

        let mut session = self.inner.session.lock();
        let mut loader = handle.lock();
        let is_empty = loader.sanity_list().is_empty();
        let status = loader.finish(name, is_empty)?;
        session.end_processing();

        info!(
            project = %name,
            status = %status,
            items = loader.sanity_list().len(),
            "Project load finished"
        );
        Ok(status)
    }

    /// Store the externally checked item UUIDs for `name`
    pub fn set_sanity_list(&self, name: &str, uuids: Vec<Uuid>) -> Result<()> {
        let handle = self.handle_of(name)?;
        handle.lock().set_sanity_list(uuids);
        Ok(())
    }

    /// Get the sanity list of `name`
    pub fn sanity_list(&self, name: &str) -> Result<Vec<Uuid>> {
        Ok(self.handle_of(name)?.lock().sanity_list().to_vec())
    }

    /// Get the `(current, total)` progress of `name`
    pub fn progress(&self, name: &str) -> Result<Progress> {
        Ok(self.handle_of(name)?.lock().progress())
    }

    /// Get the loader status of `name`
    pub fn status_of(&self, name: &str) -> Result<LoaderStatus> {
        Ok(self.handle_of(name)?.lock().status())
    }

    /// Watch progress changes for `name` without polling.
    pub fn subscribe(&self, name: &str) -> Result<watch::Receiver<Progress>> {
        Ok(self.handle_of(name)?.lock().subscribe())
    }
}
