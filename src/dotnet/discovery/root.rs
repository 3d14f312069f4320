use super::{relative_path, DiscoveryOptions, ProjectCandidate, ProjectFileProvider};
use crate::dotnet::constants::PROJECT_FILE_EXTENSIONS;
use crate::dotnet::project_file::ProjectDescriptor;
use crate::error::ResolutionError;
use crate::repo::SourceRepo;
use tracing::debug;

/// Looks for a project file directly in the repository root.
///
/// Without a kind filter the first file of the highest-priority extension is returned
/// as-is. With a filter, that file must classify as the wanted kind.
pub struct RootProjectFileProvider;

impl ProjectFileProvider for RootProjectFileProvider {
    fn name(&self) -> &'static str {
        "root"
    }

    fn discover(
        &self,
        repo: &SourceRepo,
        options: &DiscoveryOptions,
    ) -> Result<Option<ProjectCandidate>, ResolutionError> {
        for extension in PROJECT_FILE_EXTENSIONS {
            let files = repo.enumerate_files(extension, false)?;
            let Some(file) = files.into_iter().next() else {
                continue;
            };
            let path = relative_path(repo, &file);

            let Some(wanted) = options.kind_filter else {
                return Ok(Some(ProjectCandidate::unclassified(path)));
            };

            let descriptor = ProjectDescriptor::parse(&repo.read_file(&file)?)?;
            if descriptor.kind == wanted {
                return Ok(Some(ProjectCandidate {
                    path,
                    kind: Some(descriptor.kind),
                    target_framework: descriptor.target_framework,
                }));
            }

            debug!(
                project = %path.display(),
                kind = %descriptor.kind,
                wanted = %wanted,
                "Root project file is not of the requested kind"
            );
            return Ok(None);
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dotnet::discovery::tests::{repo, FUNCTIONS_PROJECT, LIBRARY_PROJECT, WEB_PROJECT};
    use crate::dotnet::project_file::ProjectKind;
    use std::path::PathBuf;

    fn filtered(kind: ProjectKind) -> DiscoveryOptions {
        DiscoveryOptions {
            kind_filter: Some(kind),
            ..Default::default()
        }
    }

    #[test]
    fn test_returns_first_root_file_unconditionally() {
        let repo = repo(&[
            ("b.csproj", WEB_PROJECT),
            ("a.csproj", LIBRARY_PROJECT),
            ("src/Web.csproj", WEB_PROJECT),
        ]);
        let found = RootProjectFileProvider
            .discover(&repo, &DiscoveryOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(found.path, PathBuf::from("a.csproj"));
        assert_eq!(found.kind, None);
    }

    #[test]
    fn test_csproj_takes_priority_over_fsproj() {
        let repo = repo(&[("App.fsproj", WEB_PROJECT), ("Zed.csproj", WEB_PROJECT)]);
        let found = RootProjectFileProvider
            .discover(&repo, &DiscoveryOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(found.path, PathBuf::from("Zed.csproj"));

        let repo = super::super::tests::repo(&[("App.fsproj", WEB_PROJECT)]);
        let found = RootProjectFileProvider
            .discover(&repo, &DiscoveryOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(found.path, PathBuf::from("App.fsproj"));
    }

    #[test]
    fn test_nothing_at_root() {
        let repo = repo(&[("src/Web/Web.csproj", WEB_PROJECT)]);
        let found = RootProjectFileProvider
            .discover(&repo, &DiscoveryOptions::default())
            .unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_kind_filter_requires_classification() {
        let repo = repo(&[("Functions.csproj", FUNCTIONS_PROJECT)]);

        let found = RootProjectFileProvider
            .discover(&repo, &filtered(ProjectKind::FunctionApplication))
            .unwrap()
            .unwrap();
        assert_eq!(found.kind, Some(ProjectKind::FunctionApplication));
        assert_eq!(found.target_framework.as_deref(), Some("net6.0"));

        let found = RootProjectFileProvider
            .discover(&repo, &filtered(ProjectKind::WebApplication))
            .unwrap();
        assert_eq!(found, None);
    }
}
