use super::{relative_path, DiscoveryOptions, ProjectCandidate, ProjectFileProvider};
use crate::dotnet::constants::PROJECT_FILE_EXTENSIONS;
use crate::dotnet::project_file::{ProjectDescriptor, ProjectKind};
use crate::error::ResolutionError;
use crate::repo::SourceRepo;
use std::collections::HashMap;
use tracing::debug;

/// Searches the whole tree and classifies every project file it finds.
///
/// Only the first extension with any matches is considered, so `.fsproj` files are seen
/// only in repositories without a single `.csproj`. The bucket for the requested kind
/// (or the first non-empty bucket in [`ProjectKind::PRECEDENCE`]) must hold exactly one
/// file; more than one is an ambiguity the caller has to resolve.
pub struct ProbeProjectFileProvider;

impl ProjectFileProvider for ProbeProjectFileProvider {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn discover(
        &self,
        repo: &SourceRepo,
        options: &DiscoveryOptions,
    ) -> Result<Option<ProjectCandidate>, ResolutionError> {
        if options.disable_recursive_lookup {
            debug!("Recursive project lookup is disabled");
            return Ok(None);
        }

        let mut files = Vec::new();
        for extension in PROJECT_FILE_EXTENSIONS {
            files = repo.enumerate_files(extension, true)?;
            if !files.is_empty() {
                break;
            }
            debug!(extension, "No project files with this extension");
        }
        if files.is_empty() {
            return Ok(None);
        }

        let mut buckets: HashMap<ProjectKind, Vec<ProjectCandidate>> = HashMap::new();
        for file in &files {
            let descriptor = ProjectDescriptor::parse(&repo.read_file(file)?)?;
            let path = relative_path(repo, file);
            debug!(project = %path.display(), kind = %descriptor.kind, "Classified project file");

            buckets.entry(descriptor.kind).or_default().push(ProjectCandidate {
                path,
                kind: Some(descriptor.kind),
                target_framework: descriptor.target_framework,
            });
        }

        let selected = match options.kind_filter {
            Some(kind) => Some(kind),
            None => ProjectKind::PRECEDENCE
                .into_iter()
                .find(|kind| buckets.get(kind).is_some_and(|b| !b.is_empty())),
        };
        let Some(kind) = selected else {
            return Ok(None);
        };

        let mut matches = buckets.remove(&kind).unwrap_or_default();
        match matches.len() {
            0 => {
                debug!(kind = %kind, "No project file of the requested kind");
                Ok(None)
            }
            1 => Ok(matches.pop()),
            _ => Err(ResolutionError::AmbiguousCandidates {
                kind: kind.display_name().to_string(),
                candidates: matches.into_iter().map(|c| c.path).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dotnet::discovery::tests::{
        repo, BLAZOR_PROJECT, FUNCTIONS_PROJECT, LIBRARY_PROJECT, WEB_PROJECT,
    };
    use std::path::PathBuf;

    fn filtered(kind: ProjectKind) -> DiscoveryOptions {
        DiscoveryOptions {
            kind_filter: Some(kind),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_web_project_in_subdirectory() {
        let repo = repo(&[
            ("src/Web/Web.csproj", WEB_PROJECT),
            ("tests/Web.Tests/Web.Tests.csproj", LIBRARY_PROJECT),
        ]);

        let found = ProbeProjectFileProvider
            .discover(&repo, &DiscoveryOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(found.path, PathBuf::from("src/Web/Web.csproj"));
        assert_eq!(found.kind, Some(ProjectKind::WebApplication));
    }

    #[test]
    fn test_ambiguity_lists_only_selected_kind() {
        let repo = repo(&[
            ("src/WebApp1/WebApp1.csproj", WEB_PROJECT),
            ("src/WebApp2/WebApp2.csproj", WEB_PROJECT),
            ("src/Functions/Functions.csproj", FUNCTIONS_PROJECT),
        ]);

        let err = ProbeProjectFileProvider
            .discover(&repo, &filtered(ProjectKind::WebApplication))
            .unwrap_err();

        match err {
            ResolutionError::AmbiguousCandidates { kind, candidates } => {
                assert_eq!(kind, "web application");
                assert_eq!(
                    candidates,
                    vec![
                        PathBuf::from("src/WebApp1/WebApp1.csproj"),
                        PathBuf::from("src/WebApp2/WebApp2.csproj"),
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_kind_filter_selects_other_bucket() {
        let repo = repo(&[
            ("src/WebApp1/WebApp1.csproj", WEB_PROJECT),
            ("src/WebApp2/WebApp2.csproj", WEB_PROJECT),
            ("src/Functions/Functions.csproj", FUNCTIONS_PROJECT),
        ]);

        let found = ProbeProjectFileProvider
            .discover(&repo, &filtered(ProjectKind::FunctionApplication))
            .unwrap()
            .unwrap();
        assert_eq!(found.path, PathBuf::from("src/Functions/Functions.csproj"));
    }

    #[test]
    fn test_kind_filter_without_match_is_none() {
        let repo = repo(&[("src/Web/Web.csproj", WEB_PROJECT)]);
        let found = ProbeProjectFileProvider
            .discover(&repo, &filtered(ProjectKind::StaticClientApplication))
            .unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_precedence_without_filter() {
        let repo = repo(&[
            ("src/Client/Client.csproj", BLAZOR_PROJECT),
            ("src/Api/Api.csproj", FUNCTIONS_PROJECT),
        ]);
        let found = ProbeProjectFileProvider
            .discover(&repo, &DiscoveryOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(found.kind, Some(ProjectKind::StaticClientApplication));

        let only_libraries = crate::dotnet::discovery::tests::repo(&[
            ("src/A/A.csproj", LIBRARY_PROJECT),
            ("src/B/B.csproj", LIBRARY_PROJECT),
        ]);
        let err = ProbeProjectFileProvider
            .discover(&only_libraries, &DiscoveryOptions::default())
            .unwrap_err();
        assert!(matches!(err, ResolutionError::AmbiguousCandidates { .. }));
    }

    #[test]
    fn test_fsproj_only_when_no_csproj_exists() {
        let repo = repo(&[
            ("src/Web/Web.fsproj", WEB_PROJECT),
            ("src/Lib/Lib.csproj", LIBRARY_PROJECT),
        ]);
        let found = ProbeProjectFileProvider
            .discover(&repo, &DiscoveryOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(found.path, PathBuf::from("src/Lib/Lib.csproj"));

        let fsharp = crate::dotnet::discovery::tests::repo(&[("src/Web/Web.fsproj", WEB_PROJECT)]);
        let found = ProbeProjectFileProvider
            .discover(&fsharp, &DiscoveryOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(found.path, PathBuf::from("src/Web/Web.fsproj"));
    }

    #[test]
    fn test_disabled() {
        let repo = repo(&[("src/Web/Web.csproj", WEB_PROJECT)]);
        let options = DiscoveryOptions {
            disable_recursive_lookup: true,
            ..Default::default()
        };
        assert_eq!(ProbeProjectFileProvider.discover(&repo, &options).unwrap(), None);
    }

    #[test]
    fn test_malformed_project_fails_the_probe() {
        let repo = repo(&[
            ("src/Web/Web.csproj", WEB_PROJECT),
            ("src/Broken/Broken.csproj", "<Project><PropertyGroup></Project>"),
        ]);
        let err = ProbeProjectFileProvider
            .discover(&repo, &DiscoveryOptions::default())
            .unwrap_err();
        assert!(matches!(err, ResolutionError::MalformedInput(_)));
    }
}
