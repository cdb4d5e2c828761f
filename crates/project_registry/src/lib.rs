//! Project Registry
//!
//! In-process directory of labeling projects for a session.
//! Provides thread-safe:
//! - Project ID allocation (reseedable from persisted projects)
//! - Name ↔ ID mapping with per-project loader handles
//! - Loader state machine (unset → loading → loaded | empty) with progress
//! - The single process-wide file/folder selection session
//!
//! Storage and file-system scanning stay with the caller; see
//! [`PersistenceStore`] for the storage seam.

mod allocator;
mod directory;
mod error;
mod loader;
mod persistence;
mod registry;
mod session;

pub use allocator::ProjectIdAllocator;
pub use directory::{ProjectDirectory, ProjectRecord};
pub use error::{RegistryError, Result};
pub use loader::{LoaderHandle, LoaderStatus, ProjectLoader, Progress};
pub use persistence::{InMemoryStore, PersistenceStore};
pub use registry::ProjectRegistry;
pub use session::{SelectionKind, SelectionSession, SelectorStatus, SessionSnapshot};
