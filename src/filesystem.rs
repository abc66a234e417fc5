//! In-memory filesystem used to stage package trees between a repository
//! checkout and the target directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Represents a file with content and metadata
#[derive(Debug, Clone)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
    /// File permissions (simplified as u32)
    pub permissions: u32,
    /// File modification time
    pub modified_time: SystemTime,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            permissions: 0o644, // Default permissions
            modified_time: SystemTime::now(),
        }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }

    /// Get file size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// In-memory filesystem for staging file trees
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    /// Files stored as path -> content mapping
    files: HashMap<PathBuf, File>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a directory tree from disk, with paths relative to `root`.
    ///
    /// `.git` directories are skipped. Unix permission bits are captured so
    /// executables survive the round trip to the target directory.
    pub fn from_dir(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::PathMissing {
                path: root.display().to_string(),
            });
        }

        let mut fs = Self::new();

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
        {
            let entry = entry.map_err(|e| Error::Filesystem {
                message: format!("Failed to walk '{}': {}", root.display(), e),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| Error::Filesystem {
                    message: format!("Failed to relativize '{}': {}", entry.path().display(), e),
                })?
                .to_path_buf();

            let content = std::fs::read(entry.path())?;
            let metadata = entry.metadata().map_err(|e| Error::Filesystem {
                message: format!("Failed to stat '{}': {}", entry.path().display(), e),
            })?;

            let permissions = {
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    metadata.permissions().mode() & 0o777
                }
                #[cfg(not(unix))]
                {
                    0o644
                }
            };

            let file = File {
                content,
                permissions,
                modified_time: metadata
                    .modified()
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
            };

            fs.add_file(relative_path, file)?;
        }

        Ok(fs)
    }

    /// Add or update a file
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) -> Result<()> {
        self.files.insert(path.as_ref().to_path_buf(), file);
        Ok(())
    }

    /// Add a file with content
    pub fn add_file_content<P: AsRef<Path>>(&mut self, path: P, content: Vec<u8>) -> Result<()> {
        self.add_file(path, File::new(content))
    }

    /// Add a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        self.add_file(path, File::from_string(content))
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        self.files.get(path.as_ref())
    }

    /// Check if a file exists
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// List all files
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over all files as (path, file) pairs
    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &File)> {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_memory_fs_basic_operations() {
        let mut fs = MemoryFS::new();
        assert!(fs.is_empty());

        fs.add_file_string("README.md", "# Package").unwrap();
        fs.add_file_string("src/lib.py", "def lib(): pass").unwrap();

        assert_eq!(fs.len(), 2);
        assert!(fs.exists("README.md"));
        assert!(fs.exists("src/lib.py"));
        assert!(!fs.exists("missing.txt"));

        let file = fs.get_file("README.md").unwrap();
        assert_eq!(file.content, b"# Package");
        assert_eq!(file.size(), 9);
    }

    #[test]
    fn test_from_dir_loads_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), b"alpha").unwrap();
        fs::write(root.join("sub/b.txt"), b"beta").unwrap();

        let loaded = MemoryFS::from_dir(root).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.exists("a.txt"));
        assert!(loaded.exists("sub/b.txt"));
        assert_eq!(loaded.get_file("sub/b.txt").unwrap().content, b"beta");
    }

    #[test]
    fn test_from_dir_skips_git_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/config"), b"[core]").unwrap();
        fs::write(root.join("pkg.json"), b"{}").unwrap();

        let loaded = MemoryFS::from_dir(root).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.exists("pkg.json"));
        assert!(!loaded.exists(".git/config"));
    }

    #[test]
    fn test_from_dir_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let err = MemoryFS::from_dir(&temp_dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, Error::PathMissing { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn test_from_dir_captures_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let script = root.join("run.sh");
        fs::write(&script, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let loaded = MemoryFS::from_dir(root).unwrap();
        assert_eq!(loaded.get_file("run.sh").unwrap().permissions, 0o755);
    }
}
