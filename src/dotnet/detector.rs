//! .NET platform detection: which project to build and with which runtime and SDK.

use super::constants::PLATFORM_NAME;
use super::discovery::{DiscoveryOptions, ProjectFileDiscovery};
use super::project_file::ProjectDescriptor;
use crate::error::ResolutionError;
use crate::repo::SourceRepo;
use crate::version::{verify_runtime_version, SdkResolver, VersionCatalog};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    DotNet,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::DotNet => f.write_str(PLATFORM_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDetectorResult {
    pub platform: Platform,
    pub runtime_version: String,
    pub sdk_version: Option<String>,
    /// Relative to the repository root
    pub project_file: PathBuf,
    /// Directory of the project file, relative to the repository root
    pub app_directory: PathBuf,
    pub output_type: String,
    /// `AssemblyName` of the project, else its file stem
    pub assembly_name: Option<String>,
    pub install_aot_workloads: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DetectorOptions {
    pub discovery: DiscoveryOptions,
    /// Runtime version pinned by the caller; skips target framework mapping
    pub runtime_version: Option<String>,
    /// Resolve the SDK through roll-forward instead of the catalog's pairing
    pub enable_dynamic_install: bool,
}

pub struct DotNetDetector<C: VersionCatalog> {
    catalog: C,
    discovery: ProjectFileDiscovery,
    sdk_resolver: SdkResolver,
    runtime_override: Option<String>,
    enable_dynamic_install: bool,
}

impl<C: VersionCatalog> DotNetDetector<C> {
    pub fn new(catalog: C, options: DetectorOptions) -> Self {
        Self {
            catalog,
            discovery: ProjectFileDiscovery::new(options.discovery),
            sdk_resolver: SdkResolver::new(),
            runtime_override: options
                .runtime_version
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            enable_dynamic_install: options.enable_dynamic_install,
        }
    }

    pub fn discovery(&self) -> &ProjectFileDiscovery {
        &self.discovery
    }

    /// Detects a .NET application in `repo`.
    ///
    /// `Ok(None)` means there is no project file, or the project declares no target
    /// framework. A runtime version outside the catalog fails with
    /// [`ResolutionError::UnsupportedVersion`].
    pub fn detect(&self, repo: &SourceRepo) -> Result<Option<PlatformDetectorResult>, ResolutionError> {
        let Some(candidate) = self.discovery.discover(repo)? else {
            debug!("No .NET project file found");
            return Ok(None);
        };

        let descriptor = ProjectDescriptor::parse(&repo.read_file(&candidate.path)?)?;
        let Some(target_framework) = descriptor.target_framework.clone() else {
            debug!(
                project = %candidate.path.display(),
                "Project declares no target framework, cannot detect a version"
            );
            return Ok(None);
        };

        let requested = match &self.runtime_override {
            Some(version) => Some(version.clone()),
            None => descriptor.runtime_version(),
        };
        let requested = match requested {
            Some(version) => version,
            None => {
                debug!(
                    target_framework = %target_framework,
                    "Target framework has no runtime version, using the catalog default"
                );
                match self.catalog.default_runtime_version().map_err(ResolutionError::Catalog)? {
                    Some(version) => version,
                    None => return Ok(None),
                }
            }
        };

        let runtime_version = self.verify_runtime(&requested)?;
        let sdk_version = self.resolve_sdk(repo, &runtime_version)?;

        let app_directory = candidate
            .path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();

        info!(
            project = %candidate.path.display(),
            runtime = %runtime_version,
            sdk = ?sdk_version,
            "Detected .NET application"
        );

        let assembly_name = descriptor.assembly_name_or_default(&candidate.path);
        Ok(Some(PlatformDetectorResult {
            platform: Platform::DotNet,
            runtime_version,
            sdk_version,
            project_file: candidate.path,
            app_directory,
            assembly_name,
            install_aot_workloads: descriptor.install_aot_workloads(),
            output_type: descriptor.output_type,
        }))
    }

    fn verify_runtime(&self, requested: &str) -> Result<String, ResolutionError> {
        let supported = self
            .catalog
            .supported_runtime_versions()
            .map_err(ResolutionError::Catalog)?;

        verify_runtime_version(PLATFORM_NAME, requested, &supported)
    }

    fn resolve_sdk(
        &self,
        repo: &SourceRepo,
        runtime_version: &str,
    ) -> Result<Option<String>, ResolutionError> {
        if self.enable_dynamic_install {
            let available = self
                .catalog
                .available_sdk_versions()
                .map_err(ResolutionError::Catalog)?;
            return self
                .sdk_resolver
                .resolve(repo, Some(runtime_version), &available);
        }

        self.catalog
            .sdk_for_runtime(runtime_version)
            .map_err(ResolutionError::Catalog)
    }
}
