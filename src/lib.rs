//! buildprobe - .NET build detection for container image builds
//!
//! Given a source repository, buildprobe decides which project file to build, which
//! runtime version its target framework needs and which SDK to build it with.
//!
//! # Core Concepts
//!
//! - **Project discovery**: an explicit override, then the repository root, then a
//!   recursive probe that classifies every project file it finds
//! - **Version catalog**: the runtime and SDK versions a build image can provide
//! - **Roll-forward**: `global.json` rules choosing an SDK from the catalog
//!
//! # Example Usage
//!
//! ```no_run
//! use buildprobe::{DetectorOptions, DotNetDetector, SourceRepo, StaticVersionCatalog};
//!
//! fn detect() -> anyhow::Result<()> {
//!     let catalog = StaticVersionCatalog::new().with_runtime("8.0.1", "8.0.101");
//!     let detector = DotNetDetector::new(catalog, DetectorOptions::default());
//!
//!     let repo = SourceRepo::open("/src/app")?;
//!     if let Some(result) = detector.detect(&repo)? {
//!         println!("{} with SDK {:?}", result.runtime_version, result.sdk_version);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`version`]: version values, range matching, roll-forward and catalogs
//! - [`dotnet`]: project file reader, discovery chain and detector
//! - [`repo`] / [`fs`]: read-only repository access over a swappable file system

pub mod cli;
pub mod config;
pub mod dotnet;
pub mod error;
pub mod fs;
pub mod repo;
pub mod util;
pub mod version;

pub use config::{BuildprobeConfig, ConfigError};
pub use dotnet::{
    DetectorOptions, DiscoveryOptions, DotNetDetector, PlatformDetectorResult, ProjectDescriptor,
    ProjectFileDiscovery, ProjectKind,
};
pub use error::{ErrorKind, ResolutionError};
pub use repo::SourceRepo;
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use version::{
    max_satisfying, OnDiskVersionCatalog, RollForwardDescriptor, RollForwardPolicy, SdkResolver,
    SdkVersion, StaticVersionCatalog, VersionCatalog,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_buildprobe() {
        assert_eq!(NAME, "buildprobe");
    }
}
