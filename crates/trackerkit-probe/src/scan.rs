//! Input file collection.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::warn;
use walkdir::WalkDir;

/// Expand `paths` into a sorted list of regular files.
///
/// Files are taken as given. Directories contribute their direct children,
/// or every file below them when `recursive` is set. A path that does not
/// exist is an error; unreadable entries inside a directory are skipped.
pub fn collect_files(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            walk(path, recursive, &mut files);
        } else {
            bail!("no such file or directory: {}", path.display());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn walk(root: &Path, recursive: bool, files: &mut Vec<PathBuf>) {
    let depth = if recursive { usize::MAX } else { 1 };
    for entry in WalkDir::new(root).follow_links(true).max_depth(depth) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => warn!(root = %root.display(), error = %err, "skipping unreadable entry"),
        }
    }
}
