//! # Project Loader
//!
//! Command-line host for [`project_registry`]: picks a file or folder,
//! registers the project, and walks the registry through one load.
//!
//! ## Module Overview
//!
//! - [`config`] - Configuration management
//! - [`logging`] - Tracing subscriber setup and the run summary
//! - [`walker`] - File-system scan behind a selection
//! - [`pipeline`] - The select → load → finish cycle

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod walker;

pub use config::Config;
pub use pipeline::LoadReport;
