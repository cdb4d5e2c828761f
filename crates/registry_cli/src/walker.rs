//! File-system walker
//!
//! Enumerates the labeling items behind a picker selection.

use anyhow::{Context, Result};
use project_registry::SelectionKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Items under `selection`, filtered by extension and sorted by path.
///
/// A `File` selection yields at most the file itself.
pub fn collect_items(
    selection: &Path,
    kind: SelectionKind,
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    let metadata = std::fs::metadata(selection)
        .with_context(|| format!("Cannot access selection {}", selection.display()))?;

    let mut items = match kind {
        SelectionKind::File => {
            if !metadata.is_file() {
                anyhow::bail!("{} is not a file", selection.display());
            }
            if has_allowed_extension(selection, extensions) {
                vec![selection.to_path_buf()]
            } else {
                Vec::new()
            }
        }
        SelectionKind::Folder => {
            if !metadata.is_dir() {
                anyhow::bail!("{} is not a folder", selection.display());
            }
            WalkDir::new(selection)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable entry");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| has_allowed_extension(path, extensions))
                .collect()
        }
    };

    items.sort();
    debug!(selection = %selection.display(), count = items.len(), "Selection scanned");

    Ok(items)
}

fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}
