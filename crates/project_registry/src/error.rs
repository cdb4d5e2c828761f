use thiserror::Error;

use crate::loader::LoaderStatus;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Project already registered: {0}")]
    DuplicateProject(String),

    #[error("Project id {0} is already assigned to another project")]
    DuplicateProjectId(u32),

    #[error("Project ids exhausted")]
    IdsExhausted,

    #[error("No project registered under id {0}")]
    UnknownProjectId(u32),

    #[error("Selection kind not allowed: {0}. Allowed values are file/folder")]
    InvalidKind(String),

    #[error("No project is focused")]
    NoFocus,

    #[error("Cannot {action} project {project} while it is {status}")]
    InvalidTransition {
        project: String,
        status: LoaderStatus,
        action: &'static str,
    },

    #[error("Picker unavailable: a selection window is open or a load is processing")]
    PickerUnavailable,

    #[error("Project {0} is still loading")]
    LoadInProgress(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
