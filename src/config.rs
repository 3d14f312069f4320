//! Configuration management for buildprobe
//!
//! Settings are read from environment variables with defaults, the same switches a build
//! host passes to the detection step.
//!
//! # Environment Variables
//!
//! - `BUILDPROBE_PROJECT`: Project file to build, relative to the repository root
//! - `BUILDPROBE_APP_TYPE`: Kind of project to pick (webapps|functions|static-sites|blazor-wasm)
//! - `BUILDPROBE_DISABLE_RECURSIVE_LOOKUP`: Only look for project files at the root - default: "false"
//! - `BUILDPROBE_ENABLE_DYNAMIC_INSTALL`: Pick the SDK via global.json roll-forward - default: "false"
//! - `BUILDPROBE_DOTNET_RUNTIME_VERSION`: Runtime version to use instead of the target framework
//! - `BUILDPROBE_DOTNET_ROOT`: .NET installation scanned for versions - default: "/usr/share/dotnet"
//! - `BUILDPROBE_VERSIONS_FILE`: JSON version catalog used instead of the installation
//! - `BUILDPROBE_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use buildprobe::BuildprobeConfig;
//!
//! let config = BuildprobeConfig::default();
//! config.validate().expect("Invalid configuration");
//! let options = config.discovery_options();
//! ```

use crate::dotnet::{DetectorOptions, DiscoveryOptions, ProjectKind};
use crate::version::{CachedVersionCatalog, OnDiskVersionCatalog, StaticVersionCatalog, VersionCatalog};
use anyhow::Result;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_DOTNET_ROOT: &str = "/usr/share/dotnet";
const DEFAULT_LOG_LEVEL: &str = "info";
const VALID_APP_TYPES: &[&str] = &["webapps", "functions", "static-sites", "blazor-wasm"];
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid app type: {0}. Valid options: webapps, functions, static-sites, blazor-wasm")]
    InvalidAppType(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildprobeConfig {
    pub project: Option<PathBuf>,
    pub app_type: Option<String>,
    pub disable_recursive_lookup: bool,
    pub enable_dynamic_install: bool,
    pub runtime_version: Option<String>,
    pub dotnet_root: PathBuf,
    pub versions_file: Option<PathBuf>,
    pub log_level: String,
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn bool_var(key: &str) -> bool {
    non_empty_var(key)
        .and_then(|v| v.to_lowercase().parse::<bool>().ok())
        .unwrap_or(false)
}

impl Default for BuildprobeConfig {
    /// Loads the configuration from `BUILDPROBE_*` environment variables
    fn default() -> Self {
        Self {
            project: non_empty_var("BUILDPROBE_PROJECT").map(PathBuf::from),
            app_type: non_empty_var("BUILDPROBE_APP_TYPE").map(|v| v.to_lowercase()),
            disable_recursive_lookup: bool_var("BUILDPROBE_DISABLE_RECURSIVE_LOOKUP"),
            enable_dynamic_install: bool_var("BUILDPROBE_ENABLE_DYNAMIC_INSTALL"),
            runtime_version: non_empty_var("BUILDPROBE_DOTNET_RUNTIME_VERSION"),
            dotnet_root: non_empty_var("BUILDPROBE_DOTNET_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOTNET_ROOT)),
            versions_file: non_empty_var("BUILDPROBE_VERSIONS_FILE").map(PathBuf::from),
            log_level: non_empty_var("BUILDPROBE_LOG_LEVEL")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
                .to_lowercase(),
        }
    }
}

impl BuildprobeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(app_type) = &self.app_type {
            if !VALID_APP_TYPES.contains(&app_type.as_str()) {
                return Err(ConfigError::InvalidAppType(app_type.clone()));
            }
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level '{}'. Valid levels: {}",
                self.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        if let Some(project) = &self.project {
            if project.is_absolute() {
                return Err(ConfigError::ValidationFailed(format!(
                    "Project path must be relative to the repository root: {}",
                    project.display()
                )));
            }
        }

        Ok(())
    }

    pub fn kind_filter(&self) -> Option<ProjectKind> {
        self.app_type.as_deref().and_then(ProjectKind::from_app_type)
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            explicit_project: self.project.clone(),
            kind_filter: self.kind_filter(),
            disable_recursive_lookup: self.disable_recursive_lookup,
        }
    }

    pub fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            discovery: self.discovery_options(),
            runtime_version: self.runtime_version.clone(),
            enable_dynamic_install: self.enable_dynamic_install,
        }
    }

    /// Version catalog from the versions file if set, else from the .NET installation
    pub fn version_catalog(&self) -> Result<CachedVersionCatalog<Arc<dyn VersionCatalog>>> {
        let catalog: Arc<dyn VersionCatalog> = match &self.versions_file {
            Some(path) => Arc::new(StaticVersionCatalog::from_file(path)?),
            None => Arc::new(OnDiskVersionCatalog::new(self.dotnet_root.clone())),
        };
        Ok(CachedVersionCatalog::new(catalog))
    }
}

impl fmt::Display for BuildprobeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Buildprobe Configuration:")?;
        if let Some(ref project) = self.project {
            writeln!(f, "  Project: {}", project.display())?;
        }
        if let Some(ref app_type) = self.app_type {
            writeln!(f, "  App Type: {}", app_type)?;
        }
        writeln!(f, "  Recursive Lookup: {}", !self.disable_recursive_lookup)?;
        writeln!(f, "  Dynamic Install: {}", self.enable_dynamic_install)?;
        if let Some(ref runtime) = self.runtime_version {
            writeln!(f, "  Runtime Version: {}", runtime)?;
        }
        match self.versions_file {
            Some(ref file) => writeln!(f, "  Versions File: {}", file.display())?,
            None => writeln!(f, "  .NET Root: {}", self.dotnet_root.display())?,
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
