//! Failure kinds surfaced by detection and version resolution.
//!
//! "Nothing detected" is not an error: resolvers return `Ok(None)` for that case.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`ResolutionError`], used for exit codes and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    NotFound,
    Ambiguous,
    Unsupported,
    Io,
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Ambiguity in selecting a {kind} project to build. Found multiple projects: {}", join_paths(.candidates))]
    AmbiguousCandidates {
        kind: String,
        candidates: Vec<PathBuf>,
    },

    #[error("Could not find the project file specified by the explicit override: '{}'", .0.display())]
    ExplicitPathNotFound(PathBuf),

    #[error("Platform '{platform}' version '{requested}' is not supported. Supported versions are: {}", .available.join(", "))]
    UnsupportedVersion {
        platform: String,
        requested: String,
        available: Vec<String>,
    },

    #[error("Malformed SDK descriptor: {0}")]
    MalformedDescriptor(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Version catalog unavailable: {0}")]
    Catalog(#[source] anyhow::Error),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ResolutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolutionError::AmbiguousCandidates { .. } => ErrorKind::Ambiguous,
            ResolutionError::ExplicitPathNotFound(_) => ErrorKind::NotFound,
            ResolutionError::UnsupportedVersion { .. } => ErrorKind::Unsupported,
            ResolutionError::MalformedDescriptor(_) | ResolutionError::MalformedInput(_) => {
                ErrorKind::MalformedInput
            }
            ResolutionError::Catalog(_) | ResolutionError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Returns a user-facing message with a hint on how to fix the failure
    pub fn help_message(&self) -> String {
        match self {
            ResolutionError::AmbiguousCandidates { .. } => format!(
                "{}\n\nHint: set BUILDPROBE_PROJECT to the relative path of the project to build.",
                self
            ),
            ResolutionError::ExplicitPathNotFound(_) => format!(
                "{}\n\nHint: BUILDPROBE_PROJECT must be relative to the repository root.",
                self
            ),
            ResolutionError::UnsupportedVersion { .. } => format!(
                "{}\n\nHint: target a supported framework or pin a runtime with \
                 BUILDPROBE_DOTNET_RUNTIME_VERSION.",
                self
            ),
            ResolutionError::MalformedDescriptor(_) => format!(
                "{}\n\nHint: global.json must contain an 'sdk.version' like '8.0.100'.",
                self
            ),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_message_lists_every_candidate() {
        let err = ResolutionError::AmbiguousCandidates {
            kind: "web application".to_string(),
            candidates: vec![
                PathBuf::from("src/WebApp1/WebApp1.csproj"),
                PathBuf::from("src/WebApp2/WebApp2.csproj"),
            ],
        };

        let message = err.to_string();
        assert!(message.contains("web application"));
        assert!(message.contains("src/WebApp1/WebApp1.csproj, src/WebApp2/WebApp2.csproj"));
        assert_eq!(err.kind(), ErrorKind::Ambiguous);
    }

    #[test]
    fn test_unsupported_version_carries_catalog() {
        let err = ResolutionError::UnsupportedVersion {
            platform: "dotnet".to_string(),
            requested: "9.9".to_string(),
            available: vec!["3.1.32".to_string(), "8.0.1".to_string()],
        };

        assert!(err.to_string().contains("'9.9'"));
        assert!(err.to_string().contains("3.1.32, 8.0.1"));
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            ResolutionError::ExplicitPathNotFound(PathBuf::from("a.csproj")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ResolutionError::MalformedDescriptor("bad".to_string()).kind(),
            ErrorKind::MalformedInput
        );
        assert_eq!(
            ResolutionError::MalformedInput("bad".to_string()).kind(),
            ErrorKind::MalformedInput
        );
        assert_eq!(
            ResolutionError::Catalog(anyhow::anyhow!("offline")).kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn test_help_message_includes_hint() {
        let err = ResolutionError::ExplicitPathNotFound(PathBuf::from("src/missing.csproj"));
        let help = err.help_message();

        assert!(help.contains("src/missing.csproj"));
        assert!(help.contains("BUILDPROBE_PROJECT"));
    }
}
