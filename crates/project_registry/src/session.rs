//! Selection Session
//!
//! Process-wide picker state: at most one file/folder window, never open
//! while a load is processing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{RegistryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    File,
    Folder,
}

impl FromStr for SelectionKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(SelectionKind::File),
            "folder" => Ok(SelectionKind::Folder),
            other => Err(RegistryError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionKind::File => f.write_str("file"),
            SelectionKind::Folder => f.write_str("folder"),
        }
    }
}

/// Coarse phase of the picker / database update cycle, for front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectorStatus {
    #[default]
    DidNotInitiate,
    WindowOpen,
    WindowCloseDatabaseNotUpdated,
    WindowCloseLoadingFiles,
    WindowCloseDatabaseUpdating,
    WindowCloseDatabaseUpdated,
}

/// Read-only copy of the session fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub is_window_open: bool,
    pub is_processing: bool,
    pub current_selection_kind: Option<SelectionKind>,
    pub focused_project_name: String,
    pub selector_status: SelectorStatus,
    pub root_search_path: PathBuf,
}

#[derive(Debug)]
pub struct SelectionSession {
    is_window_open: bool,
    loading_project: Option<String>,
    current_selection_kind: Option<SelectionKind>,
    focused_project_name: String,
    selector_status: SelectorStatus,
    root_search_path: PathBuf,
}

impl SelectionSession {
    pub(crate) fn new(root_search_path: PathBuf) -> Self {
        Self {
            is_window_open: false,
            loading_project: None,
            current_selection_kind: None,
            focused_project_name: String::new(),
            selector_status: SelectorStatus::DidNotInitiate,
            root_search_path,
        }
    }

    pub fn is_window_open(&self) -> bool {
        self.is_window_open
    }

    pub fn is_processing(&self) -> bool {
        self.loading_project.is_some()
    }

    pub fn is_picker_available(&self) -> bool {
        !self.is_window_open && !self.is_processing()
    }

    pub fn loading_project(&self) -> Option<&str> {
        self.loading_project.as_deref()
    }

    pub fn focused_project(&self) -> Option<&str> {
        if self.focused_project_name.is_empty() {
            None
        } else {
            Some(self.focused_project_name.as_str())
        }
    }

    pub fn selector_status(&self) -> SelectorStatus {
        self.selector_status
    }

    pub fn root_search_path(&self) -> &PathBuf {
        &self.root_search_path
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            is_window_open: self.is_window_open,
            is_processing: self.is_processing(),
            current_selection_kind: self.current_selection_kind,
            focused_project_name: self.focused_project_name.clone(),
            selector_status: self.selector_status,
            root_search_path: self.root_search_path.clone(),
        }
    }

    /// Check-and-open in one step.
    pub(crate) fn open(&mut self, kind: SelectionKind) -> Result<()> {
        if !self.is_picker_available() {
            return Err(RegistryError::PickerUnavailable);
        }
        self.current_selection_kind = Some(kind);
        self.is_window_open = true;
        self.selector_status = SelectorStatus::WindowOpen;
        Ok(())
    }

    pub(crate) fn close(&mut self) {
        if self.is_window_open && !self.is_processing() {
            self.selector_status = SelectorStatus::WindowCloseDatabaseNotUpdated;
        }
        self.is_window_open = false;
    }

    pub(crate) fn focus(&mut self, name: &str) {
        self.focused_project_name = name.to_string();
    }

    /// A different project may not start while one is still processing.
    pub(crate) fn check_can_load(&self, name: &str) -> Result<()> {
        match &self.loading_project {
            Some(current) if current != name => Err(RegistryError::LoadInProgress(current.clone())),
            _ => Ok(()),
        }
    }

    pub(crate) fn begin_processing(&mut self, name: &str) {
        self.loading_project = Some(name.to_string());
        self.focused_project_name = name.to_string();
        self.is_window_open = false;
        self.selector_status = SelectorStatus::WindowCloseLoadingFiles;
    }

    pub(crate) fn mark_updating(&mut self, name: &str) {
        if self.loading_project.as_deref() == Some(name) {
            self.selector_status = SelectorStatus::WindowCloseDatabaseUpdating;
        }
    }

    pub(crate) fn abort_processing(&mut self) {
        self.loading_project = None;
        self.focused_project_name.clear();
        self.is_window_open = false;
        self.selector_status = SelectorStatus::WindowCloseDatabaseNotUpdated;
    }

    pub(crate) fn end_processing(&mut self) {
        self.loading_project = None;
        self.focused_project_name.clear();
        self.selector_status = SelectorStatus::WindowCloseDatabaseUpdated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SelectionSession {
        SelectionSession::new(PathBuf::from("/data"))
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("file".parse::<SelectionKind>().unwrap(), SelectionKind::File);
        assert_eq!("folder".parse::<SelectionKind>().unwrap(), SelectionKind::Folder);
        assert_eq!(
            "Folder".parse::<SelectionKind>(),
            Err(RegistryError::InvalidKind("Folder".to_string()))
        );
    }

    #[test]
    fn test_single_window() {
        let mut session = session();
        assert!(session.is_picker_available());

        session.open(SelectionKind::File).unwrap();
        assert!(!session.is_picker_available());
        assert_eq!(session.open(SelectionKind::Folder), Err(RegistryError::PickerUnavailable));
        assert_eq!(session.snapshot().current_selection_kind, Some(SelectionKind::File));

        session.close();
        assert!(session.is_picker_available());
        assert_eq!(session.selector_status(), SelectorStatus::WindowCloseDatabaseNotUpdated);
    }

    #[test]
    fn test_processing_blocks_picker() {
        let mut session = session();
        session.open(SelectionKind::Folder).unwrap();
        session.begin_processing("cats");

        assert!(!session.is_window_open());
        assert!(session.is_processing());
        session.close();
        assert!(!session.is_picker_available());
        assert_eq!(session.selector_status(), SelectorStatus::WindowCloseLoadingFiles);

        assert!(session.check_can_load("cats").is_ok());
        assert_eq!(
            session.check_can_load("dogs"),
            Err(RegistryError::LoadInProgress("cats".to_string()))
        );

        session.end_processing();
        assert!(session.is_picker_available());
        assert_eq!(session.focused_project(), None);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(session().snapshot()).unwrap();
        assert_eq!(json["selector_status"], "DID_NOT_INITIATE");
        assert_eq!(json["focused_project_name"], "");
    }
}
