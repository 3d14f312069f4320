use super::global_json::{parse_global_json, GlobalJson, GLOBAL_JSON_FILE_NAME};
use super::roll_forward::{self, RollForwardDescriptor, RollForwardPolicy};
use super::sdk_version::SdkVersion;
use crate::error::ResolutionError;
use crate::repo::SourceRepo;
use tracing::{debug, info, warn};

/// Picks the exact SDK build of a repository from the available SDK versions.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdkResolver;

impl SdkResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves the SDK version for `repo`.
    ///
    /// With a `global.json`, its descriptor decides. Without one, the request is anchored
    /// at `<major>.<minor>.100` of the runtime version with `latestFeature` and prereleases
    /// allowed, so a repo never silently jumps to another runtime line. When the runtime
    /// version is unknown too, the highest available SDK wins.
    pub fn resolve(
        &self,
        repo: &SourceRepo,
        runtime_version: Option<&str>,
        available: &[String],
    ) -> Result<Option<String>, ResolutionError> {
        let descriptor = if repo.file_exists(GLOBAL_JSON_FILE_NAME) {
            let content = repo.read_file(GLOBAL_JSON_FILE_NAME)?;
            debug!(content = %content, "Found global.json");

            match parse_global_json(&content)? {
                GlobalJson::Descriptor(descriptor) => descriptor,
                GlobalJson::UnknownPolicy { policy, .. } => {
                    debug!(policy = %policy, "Cannot resolve an SDK with an unknown rollForward policy");
                    return Ok(None);
                }
            }
        } else {
            let descriptor = runtime_anchored_descriptor(runtime_version);
            debug!(
                version = %descriptor.requested,
                policy = %descriptor.policy,
                allow_prerelease = ?descriptor.allow_prerelease,
                "No global.json found, using a runtime-anchored SDK request"
            );
            descriptor
        };

        let resolved = self.resolve_descriptor(&descriptor, available);
        if let Some(sdk) = &resolved {
            info!(sdk = %sdk, policy = %descriptor.policy, "Resolved SDK version");
        }
        Ok(resolved)
    }

    /// Applies a descriptor to raw SDK versions. Unparsable entries are dropped and logged.
    pub fn resolve_descriptor(
        &self,
        descriptor: &RollForwardDescriptor,
        available: &[String],
    ) -> Option<String> {
        let (parsed, unparsable): (Vec<_>, Vec<_>) = available
            .iter()
            .map(|raw| SdkVersion::parse(raw).map_err(|_| raw.as_str()))
            .partition(Result::is_ok);

        if !unparsable.is_empty() {
            let skipped: Vec<&str> = unparsable.into_iter().filter_map(Result::err).collect();
            warn!(skipped = ?skipped, "Ignoring unparsable SDK versions");
        }

        let parsed: Vec<SdkVersion> = parsed.into_iter().filter_map(Result::ok).collect();
        roll_forward::resolve(descriptor, &parsed).map(|sdk| sdk.raw().to_string())
    }
}

fn runtime_anchored_descriptor(runtime_version: Option<&str>) -> RollForwardDescriptor {
    let anchor = runtime_version.and_then(|runtime| {
        let mut parts = runtime.trim().split('.');
        let major: u32 = parts.next()?.parse().ok()?;
        let minor: u32 = parts.next().unwrap_or("0").split('-').next()?.parse().ok()?;
        SdkVersion::parse(&format!("{}.{}.100", major, minor)).ok()
    });

    match anchor {
        Some(requested) => RollForwardDescriptor::new(requested, RollForwardPolicy::LatestFeature)
            .with_allow_prerelease(true),
        None => RollForwardDescriptor::default(),
    }
}
