//! Loader State Machine
//!
//! Per-project tracker for the "bring project data into memory" operation.
//!
//! ```text
//! Unset ──start──▶ Loading ──finish──▶ Loaded | Empty
//!                    ▲                      │
//!                    └───────start──────────┘
//! ```
//!
//! Transitions are `pub(crate)`: outside code reads a loader through its
//! [`LoaderHandle`] but mutates it only through the registry.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::{RegistryError, Result};

/// Shared handle to a project's loader, owned by the directory.
pub type LoaderHandle = Arc<Mutex<ProjectLoader>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderStatus {
    #[default]
    Unset,
    Loading,
    Loaded,
    Empty,
}

impl fmt::Display for LoaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoaderStatus::Unset => "unset",
            LoaderStatus::Loading => "loading",
            LoaderStatus::Loaded => "loaded",
            LoaderStatus::Empty => "empty",
        };
        f.write_str(name)
    }
}

/// `(current, total)` pair with `current <= total` and `total >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
}

impl Progress {
    /// Fresh progress for `expected` items. Zero becomes one so the
    /// percentage never divides by zero.
    pub fn new(expected: u32) -> Self {
        Self {
            current: 0,
            total: expected.max(1),
        }
    }

    pub fn percent(&self) -> f64 {
        f64::from(self.current) / f64::from(self.total) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.current == self.total
    }

    pub fn as_pair(&self) -> (u32, u32) {
        (self.current, self.total)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(0)
    }
}

pub struct ProjectLoader {
    status: LoaderStatus,
    progress: Progress,
    sanity_list: Vec<Uuid>,
    progress_tx: watch::Sender<Progress>,
}

impl ProjectLoader {
    pub(crate) fn new() -> Self {
        let (progress_tx, _) = watch::channel(Progress::default());
        Self {
            status: LoaderStatus::Unset,
            progress: Progress::default(),
            sanity_list: Vec::new(),
            progress_tx,
        }
    }

    pub(crate) fn new_handle() -> LoaderHandle {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn status(&self) -> LoaderStatus {
        self.status
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// UUIDs of the items that survived the external sanity check.
    pub fn sanity_list(&self) -> &[Uuid] {
        &self.sanity_list
    }

    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress_tx.subscribe()
    }

    /// Enter `Loading`. Allowed from any state; a reload resets progress.
    pub(crate) fn start(&mut self, expected: u32) {
        self.status = LoaderStatus::Loading;
        self.set_progress(Progress::new(expected));
    }

    /// Count one processed item, capped at `total`.
    pub(crate) fn advance(&mut self, project: &str) -> Result<Progress> {
        self.expect_loading(project, "advance")?;

        let mut next = self.progress;
        next.current = (next.current + 1).min(next.total);
        self.set_progress(next);

        Ok(next)
    }

    pub(crate) fn finish(&mut self, project: &str, is_empty: bool) -> Result<LoaderStatus> {
        self.expect_loading(project, "finish")?;

        self.status = if is_empty {
            LoaderStatus::Empty
        } else {
            LoaderStatus::Loaded
        };

        Ok(self.status)
    }

    /// Drop an unfinished load back to `Unset`.
    pub(crate) fn abort(&mut self, project: &str) -> Result<()> {
        self.expect_loading(project, "abort")?;
        self.status = LoaderStatus::Unset;
        self.sanity_list.clear();
        self.set_progress(Progress::default());
        Ok(())
    }

    pub(crate) fn set_sanity_list(&mut self, uuids: Vec<Uuid>) {
        self.sanity_list = uuids;
    }

    pub(crate) fn expect_loading(&self, project: &str, action: &'static str) -> Result<()> {
        if self.status != LoaderStatus::Loading {
            return Err(RegistryError::InvalidTransition {
                project: project.to_string(),
                status: self.status,
                action,
            });
        }
        Ok(())
    }

    fn set_progress(&mut self, progress: Progress) {
        self.progress = progress;
        self.progress_tx.send_if_modified(|current| {
            if *current == progress {
                false
            } else {
                *current = progress;
                true
            }
        });
    }
}

impl fmt::Debug for ProjectLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectLoader")
            .field("status", &self.status)
            .field("progress", &self.progress)
            .field("sanity_list", &self.sanity_list.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_expected_normalized() {
        let mut loader = ProjectLoader::new();
        loader.start(0);
        assert_eq!(loader.progress().as_pair(), (0, 1));
        assert_eq!(loader.status(), LoaderStatus::Loading);
    }

    #[test]
    fn test_advance_caps_at_total() {
        let mut loader = ProjectLoader::new();
        loader.start(2);

        assert_eq!(loader.advance("p").unwrap().as_pair(), (1, 2));
        assert_eq!(loader.advance("p").unwrap().as_pair(), (2, 2));
        assert_eq!(loader.advance("p").unwrap().as_pair(), (2, 2));
        assert!(loader.progress().is_complete());
    }

    #[test]
    fn test_advance_requires_loading() {
        let mut loader = ProjectLoader::new();
        let err = loader.advance("p").unwrap_err();
        assert_eq!(
            err,
            RegistryError::InvalidTransition {
                project: "p".to_string(),
                status: LoaderStatus::Unset,
                action: "advance",
            }
        );
        assert_eq!(loader.progress(), Progress::default());
    }

    #[test]
    fn test_finish_and_reload() {
        let mut loader = ProjectLoader::new();
        loader.start(3);
        loader.advance("p").unwrap();
        assert_eq!(loader.finish("p", false).unwrap(), LoaderStatus::Loaded);
        assert!(loader.finish("p", false).is_err());

        loader.start(5);
        assert_eq!(loader.status(), LoaderStatus::Loading);
        assert_eq!(loader.progress().as_pair(), (0, 5));
        assert_eq!(loader.finish("p", true).unwrap(), LoaderStatus::Empty);
    }

    #[test]
    fn test_abort_resets() {
        let mut loader = ProjectLoader::new();
        assert!(loader.abort("p").is_err());

        loader.start(3);
        loader.advance("p").unwrap();
        loader.abort("p").unwrap();
        assert_eq!(loader.status(), LoaderStatus::Unset);
        assert_eq!(loader.progress(), Progress::default());
    }

    #[test]
    fn test_percent() {
        let progress = Progress {
            current: 5,
            total: 20,
        };
        assert_eq!(progress.percent(), 25.0);
        assert_eq!(Progress::default().percent(), 0.0);
    }

    #[test]
    fn test_subscribe_sees_updates() {
        let mut loader = ProjectLoader::new();
        let rx = loader.subscribe();
        loader.start(4);
        loader.advance("p").unwrap();
        assert_eq!(rx.borrow().as_pair(), (1, 4));
    }
}
