//! SDK roll-forward policies.
//!
//! Each policy is a pure function over `(requested, available)`. The bounded policies
//! (`feature`, `minor`, `major`) cascade into the next narrower one, re-targeting at the
//! lowest available version of the next higher band.

use super::sdk_version::SdkVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollForwardPolicy {
    Disable,
    Patch,
    Feature,
    Minor,
    Major,
    LatestPatch,
    LatestFeature,
    LatestMinor,
    LatestMajor,
}

impl RollForwardPolicy {
    pub const ALL: [RollForwardPolicy; 9] = [
        RollForwardPolicy::Disable,
        RollForwardPolicy::Patch,
        RollForwardPolicy::Feature,
        RollForwardPolicy::Minor,
        RollForwardPolicy::Major,
        RollForwardPolicy::LatestPatch,
        RollForwardPolicy::LatestFeature,
        RollForwardPolicy::LatestMinor,
        RollForwardPolicy::LatestMajor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RollForwardPolicy::Disable => "disable",
            RollForwardPolicy::Patch => "patch",
            RollForwardPolicy::Feature => "feature",
            RollForwardPolicy::Minor => "minor",
            RollForwardPolicy::Major => "major",
            RollForwardPolicy::LatestPatch => "latestPatch",
            RollForwardPolicy::LatestFeature => "latestFeature",
            RollForwardPolicy::LatestMinor => "latestMinor",
            RollForwardPolicy::LatestMajor => "latestMajor",
        }
    }
}

impl fmt::Display for RollForwardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RollForwardPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RollForwardPolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown rollForward policy '{}'", s))
    }
}

/// Requested SDK version plus the policy used to satisfy it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollForwardDescriptor {
    pub requested: SdkVersion,
    pub policy: RollForwardPolicy,
    pub allow_prerelease: Option<bool>,
}

impl RollForwardDescriptor {
    pub fn new(requested: SdkVersion, policy: RollForwardPolicy) -> Self {
        Self {
            requested,
            policy,
            allow_prerelease: None,
        }
    }

    pub fn with_allow_prerelease(mut self, allow: bool) -> Self {
        self.allow_prerelease = Some(allow);
        self
    }

    /// `0.0.000` with `latestMajor`: the highest available SDK wins.
    pub fn latest_available() -> Self {
        Self::new(SdkVersion::zero(), RollForwardPolicy::LatestMajor)
    }
}

impl Default for RollForwardDescriptor {
    fn default() -> Self {
        Self::latest_available()
    }
}

/// Applies `descriptor` to `available`.
///
/// Prereleases are removed first only when `allow_prerelease` is explicitly `false`.
pub fn resolve<'a>(
    descriptor: &RollForwardDescriptor,
    available: &'a [SdkVersion],
) -> Option<&'a SdkVersion> {
    let candidates: Vec<&SdkVersion> = available
        .iter()
        .filter(|sdk| descriptor.allow_prerelease != Some(false) || !sdk.is_prerelease())
        .collect();

    let requested = &descriptor.requested;
    let resolved = match descriptor.policy {
        RollForwardPolicy::Disable => disable(requested, &candidates),
        RollForwardPolicy::Patch => patch(requested, &candidates),
        RollForwardPolicy::Feature => feature(requested, &candidates),
        RollForwardPolicy::Minor => minor(requested, &candidates),
        RollForwardPolicy::Major => major(requested, &candidates),
        RollForwardPolicy::LatestPatch => latest_patch(requested, &candidates),
        RollForwardPolicy::LatestFeature => latest_feature(requested, &candidates),
        RollForwardPolicy::LatestMinor => latest_minor(requested, &candidates),
        RollForwardPolicy::LatestMajor => latest_major(requested, &candidates),
    };

    if resolved.is_none() {
        debug!(
            policy = %descriptor.policy,
            requested = %requested,
            available = candidates.len(),
            "No SDK version satisfies the roll-forward policy"
        );
    }

    resolved
}

/// Resolves with a policy given by name. Unknown names are logged and yield `None`.
pub fn resolve_named<'a>(
    requested: &SdkVersion,
    policy: &str,
    allow_prerelease: Option<bool>,
    available: &'a [SdkVersion],
) -> Option<&'a SdkVersion> {
    match policy.parse::<RollForwardPolicy>() {
        Ok(policy) => {
            let descriptor = RollForwardDescriptor {
                requested: requested.clone(),
                policy,
                allow_prerelease,
            };
            resolve(&descriptor, available)
        }
        Err(e) => {
            warn!(error = %e, "Roll-forward resolution failed");
            None
        }
    }
}

fn max_where<'a>(
    available: &[&'a SdkVersion],
    pred: impl Fn(&SdkVersion) -> bool,
) -> Option<&'a SdkVersion> {
    available.iter().copied().filter(|sdk| pred(sdk)).max()
}

fn min_where<'a>(
    available: &[&'a SdkVersion],
    pred: impl Fn(&SdkVersion) -> bool,
) -> Option<&'a SdkVersion> {
    available.iter().copied().filter(|sdk| pred(sdk)).min()
}

fn keep<'a>(available: &[&'a SdkVersion], pred: impl Fn(&SdkVersion) -> bool) -> Vec<&'a SdkVersion> {
    available.iter().copied().filter(|sdk| pred(sdk)).collect()
}

/// Exact match only
pub fn disable<'a>(requested: &SdkVersion, available: &[&'a SdkVersion]) -> Option<&'a SdkVersion> {
    available.iter().copied().find(|sdk| *sdk == requested)
}

/// Exact match, else [`latest_patch`]
pub fn patch<'a>(requested: &SdkVersion, available: &[&'a SdkVersion]) -> Option<&'a SdkVersion> {
    disable(requested, available).or_else(|| latest_patch(requested, available))
}

/// Latest patch of the requested feature band, else of the next higher band
/// within the same major.minor.
pub fn feature<'a>(requested: &SdkVersion, available: &[&'a SdkVersion]) -> Option<&'a SdkVersion> {
    let same_minor = keep(available, |sdk| {
        sdk.major() == requested.major() && sdk.minor() == requested.minor()
    });

    let same_band = keep(&same_minor, |sdk| sdk.feature() == requested.feature());
    if !same_band.is_empty() {
        return latest_patch(requested, &same_band);
    }

    let next = min_where(&same_minor, |sdk| sdk.feature() > requested.feature())?;
    let next_band = keep(&same_minor, |sdk| sdk.feature() == next.feature());
    latest_patch(next, &next_band)
}

/// [`feature`], else the lowest higher minor of the same major
pub fn minor<'a>(requested: &SdkVersion, available: &[&'a SdkVersion]) -> Option<&'a SdkVersion> {
    if let Some(found) = feature(requested, available) {
        return Some(found);
    }

    let next = min_where(available, |sdk| {
        sdk.major() == requested.major() && sdk.minor() > requested.minor()
    })?;
    let next_minor = keep(available, |sdk| {
        sdk.major() == next.major() && sdk.minor() == next.minor()
    });
    feature(next, &next_minor)
}

/// [`minor`], else the lowest higher major
pub fn major<'a>(requested: &SdkVersion, available: &[&'a SdkVersion]) -> Option<&'a SdkVersion> {
    if let Some(found) = minor(requested, available) {
        return Some(found);
    }

    let next = min_where(available, |sdk| sdk.major() > requested.major())?;
    let next_major = keep(available, |sdk| sdk.major() == next.major());
    minor(next, &next_major)
}

pub fn latest_patch<'a>(
    requested: &SdkVersion,
    available: &[&'a SdkVersion],
) -> Option<&'a SdkVersion> {
    max_where(available, |sdk| {
        sdk.same_band(requested) && sdk.patch() >= requested.patch()
    })
}

pub fn latest_feature<'a>(
    requested: &SdkVersion,
    available: &[&'a SdkVersion],
) -> Option<&'a SdkVersion> {
    max_where(available, |sdk| {
        sdk.major() == requested.major()
            && sdk.minor() == requested.minor()
            && sdk.feature() >= requested.feature()
    })
}

pub fn latest_minor<'a>(
    requested: &SdkVersion,
    available: &[&'a SdkVersion],
) -> Option<&'a SdkVersion> {
    max_where(available, |sdk| {
        sdk.major() == requested.major() && sdk.minor() >= requested.minor()
    })
}

pub fn latest_major<'a>(
    requested: &SdkVersion,
    available: &[&'a SdkVersion],
) -> Option<&'a SdkVersion> {
    max_where(available, |sdk| sdk.major() >= requested.major())
}
