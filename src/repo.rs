//! Read-only access to the application source tree being built.

use crate::error::ResolutionError;
use crate::fs::{FileSystem, RealFileSystem};
use anyhow::{anyhow, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A source tree rooted at `root`. Relative paths are resolved against the root.
#[derive(Clone)]
pub struct SourceRepo {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl std::fmt::Debug for SourceRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl SourceRepo {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    /// Opens a repository on the real file system, canonicalizing the root.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let fs = RealFileSystem::new();
        let root = root.as_ref();
        if !fs.exists(root) {
            return Err(anyhow!("Repository path does not exist: {:?}", root));
        }
        if !fs.is_dir(root) {
            return Err(anyhow!("Repository path is not a directory: {:?}", root));
        }
        let root = fs.canonicalize(root)?;

        debug!(repo = %root.display(), "Opened source repository");
        Ok(Self::new(root, Arc::new(fs)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        self.fs.is_file(&self.resolve(path.as_ref()))
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String, ResolutionError> {
        let full = self.resolve(path.as_ref());
        self.fs
            .read_to_string(&full)
            .map_err(|source| ResolutionError::Io { path: full, source })
    }

    /// Lists files whose extension equals `extension` (case-sensitive, without the dot).
    ///
    /// Files of a directory come before the contents of its subdirectories; both are
    /// ordered by name. Returned paths are absolute (root-joined).
    pub fn enumerate_files(
        &self,
        extension: &str,
        recursive: bool,
    ) -> Result<Vec<PathBuf>, ResolutionError> {
        let files = self
            .fs
            .walk_files(&self.root, recursive)
            .map_err(|source| ResolutionError::Io {
                path: self.root.clone(),
                source,
            })?;

        Ok(files
            .into_iter()
            .filter(|file| file.extension().and_then(|e| e.to_str()) == Some(extension))
            .collect())
    }

    /// Path of `file` relative to the repository root.
    ///
    /// Walks from the file's directory up to the root, collecting directory names.
    /// The root boundary is compared case-sensitively. Relative inputs are returned as-is;
    /// `None` means the file does not live under the root.
    pub fn relative_to_root(&self, file: &Path) -> Option<PathBuf> {
        if file.is_relative() {
            return Some(file.to_path_buf());
        }

        let mut parts = vec![file.file_name()?.to_os_string()];
        let mut current = file.parent()?;
        while current != self.root.as_path() {
            parts.push(current.file_name()?.to_os_string());
            current = current.parent()?;
        }

        parts.reverse();
        Some(parts.iter().collect())
    }
}

/// Lexically normalizes a path that must stay under the repository root.
///
/// `.` segments are dropped and `..` pops a preceding segment. Returns `None` for
/// absolute paths and for paths that climb above the root.
pub fn contained_path(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn repo_with(files: &[&str]) -> SourceRepo {
        let fs = MockFileSystem::with_root(PathBuf::from("/repo"));
        for file in files {
            fs.add_file(file, "<Project />");
        }
        SourceRepo::new("/repo", Arc::new(fs))
    }

    #[test]
    fn test_enumerate_root_only() {
        let repo = repo_with(&["b.csproj", "a.csproj", "src/c.csproj", "a.fsproj"]);

        let files = repo.enumerate_files("csproj", false).unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("/repo/a.csproj"), PathBuf::from("/repo/b.csproj")]
        );
    }

    #[test]
    fn test_enumerate_recursive_lists_directory_files_before_subdirectories() {
        let repo = repo_with(&[
            "src/WebApp2/WebApp2.csproj",
            "src/WebApp1/WebApp1.csproj",
            "zz.csproj",
            "src/Root.csproj",
        ]);

        let files = repo.enumerate_files("csproj", true).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/repo/zz.csproj"),
                PathBuf::from("/repo/src/Root.csproj"),
                PathBuf::from("/repo/src/WebApp1/WebApp1.csproj"),
                PathBuf::from("/repo/src/WebApp2/WebApp2.csproj"),
            ]
        );
    }

    #[test]
    fn test_enumerate_extension_is_case_sensitive() {
        let repo = repo_with(&["App.CSPROJ"]);
        assert!(repo.enumerate_files("csproj", true).unwrap().is_empty());
    }

    #[test]
    fn test_relative_to_root() {
        let repo = repo_with(&[]);

        assert_eq!(
            repo.relative_to_root(Path::new("/repo/src/WebApp1/WebApp1.csproj")),
            Some(PathBuf::from("src").join("WebApp1").join("WebApp1.csproj"))
        );
        assert_eq!(
            repo.relative_to_root(Path::new("/repo/App.csproj")),
            Some(PathBuf::from("App.csproj"))
        );
        assert_eq!(
            repo.relative_to_root(Path::new("src/App.csproj")),
            Some(PathBuf::from("src/App.csproj"))
        );
    }

    #[test]
    fn test_relative_to_root_is_case_sensitive_at_boundary() {
        let repo = repo_with(&[]);
        assert_eq!(repo.relative_to_root(Path::new("/Repo/App.csproj")), None);
    }

    #[test]
    fn test_contained_path() {
        assert_eq!(
            contained_path(Path::new("./src/../src/App.csproj")),
            Some(PathBuf::from("src/App.csproj"))
        );
        assert_eq!(contained_path(Path::new("src/../../App.csproj")), None);
        assert_eq!(contained_path(Path::new("../outside/App.csproj")), None);
        assert_eq!(contained_path(Path::new("/etc/App.csproj")), None);
    }

    #[test]
    fn test_read_file_and_exists() {
        let repo = repo_with(&["src/App.csproj"]);

        assert!(repo.file_exists("src/App.csproj"));
        assert!(!repo.file_exists("src"));
        assert_eq!(repo.read_file("src/App.csproj").unwrap(), "<Project />");

        let err = repo.read_file("missing.csproj").unwrap_err();
        assert!(matches!(err, ResolutionError::Io { .. }));
    }
}
