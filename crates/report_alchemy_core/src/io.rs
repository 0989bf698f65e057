//! File system helpers.

use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::AlchemyError;

/// Reads a whole file into memory.
pub async fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>, AlchemyError> {
    let path = path.as_ref();
    fs::read(path).await.map_err(|e| AlchemyError::io(path, e))
}

/// Returns true if the file exists and can be opened for reading.
pub async fn file_readable(path: impl AsRef<Path>) -> bool {
    fs::File::open(path.as_ref()).await.is_ok()
}

/// Opens a file for writing, creating it or truncating existing content.
pub async fn open_for_writing(path: impl AsRef<Path>) -> Result<std::fs::File, AlchemyError> {
    let path = path.as_ref();
    let file = fs::File::create(path)
        .await
        .map_err(|e| AlchemyError::io(path, e))?;
    Ok(file.into_std().await)
}

/// Yields a directory and every ancestor up to the root of the file system.
///
/// Redundant separators and `.` components are removed first.
pub fn paths_upwards(start_directory: impl AsRef<Path>) -> impl Iterator<Item = PathBuf> {
    let normalized: PathBuf = start_directory
        .as_ref()
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let mut next = Some(normalized);
    std::iter::from_fn(move || {
        let current = next.take()?;
        next = current
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Some(current)
    })
}
