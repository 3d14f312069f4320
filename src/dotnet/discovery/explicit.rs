use super::{DiscoveryOptions, ProjectCandidate, ProjectFileProvider};
use crate::error::ResolutionError;
use crate::repo::{contained_path, SourceRepo};
use std::path::PathBuf;
use tracing::{debug, error};

/// Uses the project named by the caller, trusting it without classification.
pub struct ExplicitProjectFileProvider;

impl ProjectFileProvider for ExplicitProjectFileProvider {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn discover(
        &self,
        repo: &SourceRepo,
        options: &DiscoveryOptions,
    ) -> Result<Option<ProjectCandidate>, ResolutionError> {
        let Some(requested) = &options.explicit_project else {
            return Ok(None);
        };

        let trimmed = requested.to_string_lossy();
        let trimmed = trimmed.trim();
        if trimmed.is_empty() {
            debug!("Ignoring empty explicit project path");
            return Ok(None);
        }

        let requested = PathBuf::from(trimmed);
        let Some(relative) = contained_path(&requested) else {
            error!(
                project = %requested.display(),
                "Explicit project path must be relative and stay inside the repository"
            );
            return Err(ResolutionError::ExplicitPathNotFound(requested));
        };

        if !repo.file_exists(&relative) {
            error!(
                project = %relative.display(),
                root = %repo.root().display(),
                "Explicit project file does not exist"
            );
            return Err(ResolutionError::ExplicitPathNotFound(relative));
        }

        debug!(project = %relative.display(), "Using explicitly configured project file");
        Ok(Some(ProjectCandidate::unclassified(relative)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dotnet::discovery::tests::{repo, LIBRARY_PROJECT, WEB_PROJECT};

    fn options(path: &str) -> DiscoveryOptions {
        DiscoveryOptions {
            explicit_project: Some(PathBuf::from(path)),
            ..Default::default()
        }
    }

    #[test]
    fn test_not_configured() {
        let repo = repo(&[("App.csproj", WEB_PROJECT)]);
        let found = ExplicitProjectFileProvider
            .discover(&repo, &DiscoveryOptions::default())
            .unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_returns_path_without_classifying() {
        let repo = repo(&[("src/Lib/Lib.csproj", LIBRARY_PROJECT)]);
        let found = ExplicitProjectFileProvider
            .discover(&repo, &options(" src/Lib/Lib.csproj "))
            .unwrap()
            .unwrap();

        assert_eq!(found.path, PathBuf::from("src/Lib/Lib.csproj"));
        assert_eq!(found.kind, None);
    }

    #[test]
    fn test_missing_file_fails() {
        let repo = repo(&[("App.csproj", WEB_PROJECT)]);
        let err = ExplicitProjectFileProvider
            .discover(&repo, &options("src/Missing.csproj"))
            .unwrap_err();

        assert!(matches!(
            err,
            ResolutionError::ExplicitPathNotFound(ref p) if p == &PathBuf::from("src/Missing.csproj")
        ));
    }

    #[test]
    fn test_path_is_normalized() {
        let repo = repo(&[("src/Lib/Lib.csproj", LIBRARY_PROJECT)]);
        let found = ExplicitProjectFileProvider
            .discover(&repo, &options("./src/Web/../Lib/Lib.csproj"))
            .unwrap()
            .unwrap();

        assert_eq!(found.path, PathBuf::from("src/Lib/Lib.csproj"));
    }

    #[test]
    fn test_paths_outside_the_root_are_rejected() {
        let repo = repo(&[("App.csproj", WEB_PROJECT)]);
        // Every one of these names an existing file
        assert!(repo.file_exists("/repo/App.csproj"));

        for outside in ["/repo/App.csproj", "../repo/App.csproj", "src/../../repo/App.csproj"] {
            let err = ExplicitProjectFileProvider
                .discover(&repo, &options(outside))
                .unwrap_err();
            assert!(
                matches!(err, ResolutionError::ExplicitPathNotFound(ref p) if p == &PathBuf::from(outside)),
                "{outside} should be rejected"
            );
        }
    }

    #[test]
    fn test_blank_path_is_ignored() {
        let repo = repo(&[]);
        assert_eq!(ExplicitProjectFileProvider.discover(&repo, &options("  ")).unwrap(), None);
    }
}
