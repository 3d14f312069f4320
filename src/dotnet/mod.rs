//! .NET project discovery and platform detection

pub mod constants;
pub mod detector;
pub mod discovery;
pub mod project_file;

pub use detector::{DetectorOptions, DotNetDetector, Platform, PlatformDetectorResult};
pub use discovery::{
    DiscoveryOptions, ExplicitProjectFileProvider, ProbeProjectFileProvider, ProjectCandidate,
    ProjectFileDiscovery, ProjectFileProvider, RootProjectFileProvider,
};
pub use project_file::{runtime_version_from_target_framework, ProjectDescriptor, ProjectKind};
