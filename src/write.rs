//! Writing a staged package tree to disk.
//!
//! The final step of every load (and the copy-into-clone step of publish):
//! write all files from a [MemoryFS](crate::filesystem::MemoryFS) under a
//! target directory, creating parent directories as needed and restoring
//! Unix permission bits.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;

/// Write all files from the staged filesystem under `target`.
///
/// Existing files are overwritten; files already present under `target`
/// that the staged filesystem does not mention are left alone (callers
/// that want a pristine target remove it first).
pub fn to_disk(staged: &MemoryFS, target: &Path) -> Result<()> {
    fs::create_dir_all(target).map_err(|e| Error::Filesystem {
        message: format!("Failed to create directory '{}': {}", target.display(), e),
    })?;

    for (relative_path, file) in staged.files() {
        let full_path = target.join(relative_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }

        fs::write(&full_path, &file.content).map_err(|e| Error::Filesystem {
            message: format!("Failed to write file '{}': {}", full_path.display(), e),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(file.permissions);
            fs::set_permissions(&full_path, perms).map_err(|e| Error::Filesystem {
                message: format!(
                    "Failed to set permissions on '{}': {}",
                    full_path.display(),
                    e
                ),
            })?;
        }
    }

    Ok(())
}

/// Remove an existing target directory, ignoring its absence.
pub fn clean_target(target: &Path) -> Result<()> {
    if target.exists() {
        fs::remove_dir_all(target).map_err(|e| Error::Filesystem {
            message: format!("Failed to remove '{}': {}", target.display(), e),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::File;
    use tempfile::TempDir;

    #[test]
    fn test_write_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path();

        let mut staged = MemoryFS::new();
        staged.add_file_string("test.txt", "Hello, world!").unwrap();

        to_disk(&staged, target).unwrap();

        let content = fs::read_to_string(target.join("test.txt")).unwrap();
        assert_eq!(content, "Hello, world!");
    }

    #[test]
    fn test_write_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path();

        let mut staged = MemoryFS::new();
        staged
            .add_file_string("src/utils/helper.py", "def helper(): pass")
            .unwrap();
        staged.add_file_string("README.md", "# Package").unwrap();

        to_disk(&staged, target).unwrap();

        assert!(target.join("src/utils/helper.py").exists());
        assert!(target.join("README.md").exists());
        let content = fs::read_to_string(target.join("src/utils/helper.py")).unwrap();
        assert_eq!(content, "def helper(): pass");
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path();

        fs::write(target.join("existing.txt"), "old content").unwrap();

        let mut staged = MemoryFS::new();
        staged.add_file_string("existing.txt", "new content").unwrap();

        to_disk(&staged, target).unwrap();

        let content = fs::read_to_string(target.join("existing.txt")).unwrap();
        assert_eq!(content, "new content");
    }

    #[test]
    fn test_write_keeps_unrelated_files() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path();

        fs::write(target.join("keep.txt"), "keep me").unwrap();

        let mut staged = MemoryFS::new();
        staged.add_file_string("new.txt", "added").unwrap();

        to_disk(&staged, target).unwrap();

        assert!(target.join("keep.txt").exists());
        assert!(target.join("new.txt").exists());
    }

    #[test]
    fn test_write_creates_missing_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("does/not/exist/yet");

        let mut staged = MemoryFS::new();
        staged.add_file_string("file.txt", "content").unwrap();

        to_disk(&staged, &target).unwrap();
        assert!(target.join("file.txt").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_write_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path();

        let mut staged = MemoryFS::new();
        let mut file = File::from_string("#!/bin/sh\n");
        file.permissions = 0o755;
        staged.add_file("run.sh", file).unwrap();

        to_disk(&staged, target).unwrap();

        let mode = fs::metadata(target.join("run.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_clean_target_removes_directory() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out");
        fs::create_dir_all(target.join("nested")).unwrap();
        fs::write(target.join("nested/file.txt"), "x").unwrap();

        clean_target(&target).unwrap();
        assert!(!target.exists());

        // Removing an absent directory is not an error
        clean_target(&target).unwrap();
    }
}
