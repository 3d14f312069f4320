//! Project-file discovery.
//!
//! Providers are tried in a fixed order and the first one that finds a project wins:
//! an explicit override, then the repository root, then a recursive probe that classifies
//! every project file it sees. [`ProjectFileDiscovery`] memoizes the outcome per instance.

mod explicit;
mod probe;
mod root;

pub use explicit::ExplicitProjectFileProvider;
pub use probe::ProbeProjectFileProvider;
pub use root::RootProjectFileProvider;

use super::project_file::ProjectKind;
use crate::error::ResolutionError;
use crate::repo::SourceRepo;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Project path relative to the repository root; bypasses probing
    pub explicit_project: Option<PathBuf>,
    pub kind_filter: Option<ProjectKind>,
    pub disable_recursive_lookup: bool,
}

/// A discovered project file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCandidate {
    /// Relative to the repository root
    pub path: PathBuf,
    /// `None` when the file was returned without being classified
    pub kind: Option<ProjectKind>,
    pub target_framework: Option<String>,
}

impl ProjectCandidate {
    pub fn unclassified(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: None,
            target_framework: None,
        }
    }
}

pub trait ProjectFileProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` hands over to the next provider
    fn discover(
        &self,
        repo: &SourceRepo,
        options: &DiscoveryOptions,
    ) -> Result<Option<ProjectCandidate>, ResolutionError>;
}

/// Ordered provider chain with a per-instance memo of its first successful run
pub struct ProjectFileDiscovery {
    providers: Vec<Box<dyn ProjectFileProvider>>,
    options: DiscoveryOptions,
    cache: OnceLock<(PathBuf, Option<ProjectCandidate>)>,
}

impl ProjectFileDiscovery {
    pub fn new(options: DiscoveryOptions) -> Self {
        Self::with_providers(
            options,
            vec![
                Box::new(ExplicitProjectFileProvider),
                Box::new(RootProjectFileProvider),
                Box::new(ProbeProjectFileProvider),
            ],
        )
    }

    pub fn with_providers(
        options: DiscoveryOptions,
        providers: Vec<Box<dyn ProjectFileProvider>>,
    ) -> Self {
        Self {
            providers,
            options,
            cache: OnceLock::new(),
        }
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Finds the project to build in `repo`.
    ///
    /// The first successful result (including "nothing found") is cached for the root it
    /// was computed for. Errors are never cached. Asking about a different root computes
    /// a fresh answer without touching the cache.
    pub fn discover(&self, repo: &SourceRepo) -> Result<Option<ProjectCandidate>, ResolutionError> {
        if let Some((root, cached)) = self.cache.get() {
            if root.as_path() == repo.root() {
                debug!(root = %root.display(), "Using cached project discovery result");
                return Ok(cached.clone());
            }
            return self.run(repo);
        }

        let found = self.run(repo)?;
        let (_, cached) = self
            .cache
            .get_or_init(|| (repo.root().to_path_buf(), found.clone()));
        Ok(cached.clone())
    }

    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    fn run(&self, repo: &SourceRepo) -> Result<Option<ProjectCandidate>, ResolutionError> {
        for provider in &self.providers {
            if let Some(candidate) = provider.discover(repo, &self.options)? {
                info!(
                    provider = provider.name(),
                    project = %candidate.path.display(),
                    "Found project file"
                );
                return Ok(Some(candidate));
            }
            debug!(provider = provider.name(), "Provider found no project file");
        }

        debug!(root = %repo.root().display(), "No project file found");
        Ok(None)
    }
}

pub(crate) fn relative_path(repo: &SourceRepo, file: &Path) -> PathBuf {
    repo.relative_to_root(file).unwrap_or_else(|| file.to_path_buf())
}
