//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// A directory entry returned by `read_dir`
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Extension of the entry name without the leading dot
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }
}

/// Read-only view of a file system. Resolution never writes to the repository.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Lists directory contents ordered by entry name.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Lists the files under `dir`. A directory's files come before the contents of its
    /// subdirectories and siblings are ordered by name. Without `recursive` only the
    /// direct children of `dir` are listed.
    fn walk_files(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in self.read_dir(dir)? {
            if entry.is_file() {
                files.push(entry.path);
            } else if recursive && entry.is_dir() {
                subdirs.push(entry.path);
            }
        }

        for subdir in subdirs {
            files.extend(self.walk_files(&subdir, recursive)?);
        }
        Ok(files)
    }
}
