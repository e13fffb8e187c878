//! Match file discovery

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{IngestError, Result};

/// List the `*.json` files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Unreadable entries are logged and
/// skipped; a missing or unreadable `dir` is an error.
pub fn discover_match_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::Io {
            origin: dir.display().to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "data directory does not exist or is not a directory",
            ),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        if entry.file_type().is_file() && is_json(entry.path()) {
            files.push(entry.into_path());
        }
    }

    debug!(dir = %dir.display(), count = files.len(), "Discovered match files");
    Ok(files)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
