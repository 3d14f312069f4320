//! Sources of supported runtime and SDK versions.

use super::range::latest;
use super::sdk_version::SdkVersion;
use crate::fs::{FileSystem, RealFileSystem};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

pub trait VersionCatalog: Send + Sync {
    fn supported_runtime_versions(&self) -> Result<Vec<String>>;

    /// Runtime version to the SDK version that ships it
    fn runtime_to_sdk(&self) -> Result<BTreeMap<String, String>>;

    fn default_runtime_version(&self) -> Result<Option<String>>;

    fn available_sdk_versions(&self) -> Result<Vec<String>>;

    fn sdk_for_runtime(&self, runtime_version: &str) -> Result<Option<String>> {
        Ok(self.runtime_to_sdk()?.get(runtime_version).cloned())
    }
}

impl<C: VersionCatalog + ?Sized> VersionCatalog for Arc<C> {
    fn supported_runtime_versions(&self) -> Result<Vec<String>> {
        (**self).supported_runtime_versions()
    }

    fn runtime_to_sdk(&self) -> Result<BTreeMap<String, String>> {
        (**self).runtime_to_sdk()
    }

    fn default_runtime_version(&self) -> Result<Option<String>> {
        (**self).default_runtime_version()
    }

    fn available_sdk_versions(&self) -> Result<Vec<String>> {
        (**self).available_sdk_versions()
    }

    fn sdk_for_runtime(&self, runtime_version: &str) -> Result<Option<String>> {
        (**self).sdk_for_runtime(runtime_version)
    }
}

/// Catalog defined in code or loaded from a JSON file.
///
/// ```json
/// {
///   "defaultRuntimeVersion": "8.0.1",
///   "runtimeToSdk": { "6.0.25": "6.0.417", "8.0.1": "8.0.101" },
///   "sdkVersions": ["8.0.200"]
/// }
/// ```
///
/// `sdkVersions` lists SDKs beyond those already named in `runtimeToSdk`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticVersionCatalog {
    #[serde(default)]
    pub default_runtime_version: Option<String>,
    #[serde(default)]
    pub runtime_to_sdk: BTreeMap<String, String>,
    #[serde(default)]
    pub sdk_versions: Vec<String>,
}

impl StaticVersionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>, sdk: impl Into<String>) -> Self {
        self.runtime_to_sdk.insert(runtime.into(), sdk.into());
        self
    }

    pub fn with_sdk(mut self, sdk: impl Into<String>) -> Self {
        self.sdk_versions.push(sdk.into());
        self
    }

    pub fn with_default_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.default_runtime_version = Some(runtime.into());
        self
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse version catalog JSON")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = RealFileSystem::new().read_to_string(path)?;
        Self::from_json(&content).with_context(|| format!("Invalid version catalog {:?}", path))
    }
}

impl VersionCatalog for StaticVersionCatalog {
    fn supported_runtime_versions(&self) -> Result<Vec<String>> {
        Ok(self.runtime_to_sdk.keys().cloned().collect())
    }

    fn runtime_to_sdk(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.runtime_to_sdk.clone())
    }

    fn default_runtime_version(&self) -> Result<Option<String>> {
        match &self.default_runtime_version {
            Some(version) => Ok(Some(version.clone())),
            None => Ok(latest(self.runtime_to_sdk.keys())),
        }
    }

    fn available_sdk_versions(&self) -> Result<Vec<String>> {
        let mut sdks: Vec<String> = self.runtime_to_sdk.values().cloned().collect();
        sdks.extend(self.sdk_versions.iter().cloned());
        sdks.sort();
        sdks.dedup();
        Ok(sdks)
    }
}

const RUNTIME_DIR: &str = "shared/Microsoft.NETCore.App";
const SDK_DIR: &str = "sdk";

/// Catalog read from an installation root laid out like a `dotnet` install:
/// `<root>/shared/Microsoft.NETCore.App/<runtime>` and `<root>/sdk/<sdk>`.
pub struct OnDiskVersionCatalog {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl OnDiskVersionCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_fs(root, Arc::new(RealFileSystem::new()))
    }

    pub fn with_fs(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    fn list_versions(&self, relative: &str) -> Result<Vec<String>> {
        let dir = self.root.join(relative);
        if !self.fs.is_dir(&dir) {
            debug!(dir = %dir.display(), "Version directory does not exist");
            return Ok(Vec::new());
        }

        let entries = self.fs.read_dir(&dir)?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.is_dir())
            .map(|entry| entry.name)
            .collect())
    }
}

impl VersionCatalog for OnDiskVersionCatalog {
    fn supported_runtime_versions(&self) -> Result<Vec<String>> {
        self.list_versions(RUNTIME_DIR)
    }

    /// Pairs each runtime with the highest installed SDK of the same major.minor
    fn runtime_to_sdk(&self) -> Result<BTreeMap<String, String>> {
        let sdks: Vec<SdkVersion> = self
            .available_sdk_versions()?
            .iter()
            .filter_map(|raw| match SdkVersion::parse(raw) {
                Ok(sdk) => Some(sdk),
                Err(e) => {
                    warn!(error = %e, "Skipping installed SDK");
                    None
                }
            })
            .collect();

        let mut map = BTreeMap::new();
        for runtime in self.supported_runtime_versions()? {
            let mut parts = runtime.split('.').map(|p| p.parse::<u32>().ok());
            let (Some(Some(major)), Some(Some(minor))) = (parts.next(), parts.next()) else {
                continue;
            };
            let best = sdks
                .iter()
                .filter(|sdk| sdk.major() == major && sdk.minor() == minor)
                .max();
            if let Some(sdk) = best {
                map.insert(runtime, sdk.raw().to_string());
            }
        }
        Ok(map)
    }

    fn default_runtime_version(&self) -> Result<Option<String>> {
        let runtimes = self.supported_runtime_versions()?;
        Ok(latest(runtimes.iter().filter(|v| !v.contains('-'))))
    }

    fn available_sdk_versions(&self) -> Result<Vec<String>> {
        self.list_versions(SDK_DIR)
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    runtimes: Vec<String>,
    runtime_to_sdk: BTreeMap<String, String>,
    default_runtime: Option<String>,
    sdks: Vec<String>,
}

/// Memoizes another catalog.
///
/// The first successful lookup snapshots every list; later calls are served from the
/// snapshot. Failures are not cached, so a later call retries.
pub struct CachedVersionCatalog<C> {
    inner: C,
    snapshot: OnceLock<Snapshot>,
}

impl<C: VersionCatalog> CachedVersionCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            snapshot: OnceLock::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.get().is_some()
    }

    fn snapshot(&self) -> Result<&Snapshot> {
        if let Some(snapshot) = self.snapshot.get() {
            return Ok(snapshot);
        }

        let loaded = Snapshot {
            runtimes: self.inner.supported_runtime_versions()?,
            runtime_to_sdk: self.inner.runtime_to_sdk()?,
            default_runtime: self.inner.default_runtime_version()?,
            sdks: self.inner.available_sdk_versions()?,
        };
        debug!(
            runtimes = loaded.runtimes.len(),
            sdks = loaded.sdks.len(),
            "Loaded version catalog"
        );

        // A concurrent loader may have won; either snapshot is equivalent
        Ok(self.snapshot.get_or_init(|| loaded))
    }
}

impl<C: VersionCatalog> VersionCatalog for CachedVersionCatalog<C> {
    fn supported_runtime_versions(&self) -> Result<Vec<String>> {
        Ok(self.snapshot()?.runtimes.clone())
    }

    fn runtime_to_sdk(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.snapshot()?.runtime_to_sdk.clone())
    }

    fn default_runtime_version(&self) -> Result<Option<String>> {
        Ok(self.snapshot()?.default_runtime.clone())
    }

    fn available_sdk_versions(&self) -> Result<Vec<String>> {
        Ok(self.snapshot()?.sdks.clone())
    }
}
