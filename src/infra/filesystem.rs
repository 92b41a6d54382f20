//! Filesystem operations
//!
//! Handles build tree creation, cleanup and copying.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Recursively copy the directory `src` to `dst`
///
/// `dst` must not exist; its parent directories are created as needed.
/// Symbolic links are followed and their targets copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<u64, FilesystemError> {
    if !src.is_dir() {
        return Err(FilesystemError::NotFound {
            path: src.to_path_buf(),
        });
    }
    if dst.exists() {
        return Err(FilesystemError::AlreadyExists {
            path: dst.to_path_buf(),
        });
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| FilesystemError::Walk {
            path: src.to_path_buf(),
            error: e.to_string(),
        })?;

        // Every walked path is below `src`
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }

    tracing::debug!(
        "Copied {copied} files from {} to {}",
        src.display(),
        dst.display()
    );
    Ok(copied)
}

/// Copy a file or a directory to `dst`
///
/// A directory is copied with [`copy_tree`]. A file copied onto an existing
/// directory is placed inside it under its own name.
pub fn copy_path(src: &Path, dst: &Path) -> Result<(), FilesystemError> {
    if src.is_dir() {
        copy_tree(src, dst)?;
        return Ok(());
    }
    if !src.exists() {
        return Err(FilesystemError::NotFound {
            path: src.to_path_buf(),
        });
    }

    if dst.is_dir() {
        let name = src.file_name().ok_or_else(|| FilesystemError::NotFound {
            path: src.to_path_buf(),
        })?;
        copy_file(src, &dst.join(name))
    } else {
        copy_file(src, dst)
    }
}

/// Copy a single file, creating the parent directory of `dst`
fn copy_file(src: &Path, dst: &Path) -> Result<(), FilesystemError> {
    if let Some(parent) = dst.parent() {
        create_dir_all(parent)?;
    }
    std::fs::copy(src, dst).map_err(|e| FilesystemError::Copy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        error: e.to_string(),
    })?;
    Ok(())
}
