use crate::error::ResolutionError;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PREVIEW_MARKER: &str = "-preview";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unparsable SDK version '{0}'")]
pub struct UnparsableVersion(pub String);

impl From<UnparsableVersion> for ResolutionError {
    fn from(err: UnparsableVersion) -> Self {
        ResolutionError::MalformedInput(err.to_string())
    }
}

/// A parsed `<major>.<minor>.<featurepatch>[-preview<tag>]` SDK version.
///
/// The third segment packs the feature band and patch: `feature = featurepatch / 100`,
/// `patch = featurepatch % 100`. Final releases sort above previews with the same core.
#[derive(Debug, Clone)]
pub struct SdkVersion {
    major: u32,
    minor: u32,
    feature: u32,
    patch: u32,
    feature_patch: u32,
    preview_tag: Option<String>,
    raw: String,
}

impl SdkVersion {
    pub fn parse(raw: &str) -> Result<Self, UnparsableVersion> {
        let unparsable = || UnparsableVersion(raw.to_string());

        let (core, preview_tag) = match raw.to_ascii_lowercase().find(PREVIEW_MARKER) {
            // The marker is ASCII, so byte offsets agree between `raw` and its lowercase form
            Some(idx) => (&raw[..idx], Some(raw[idx + 1..].to_string())),
            None => (raw, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(unparsable());
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| unparsable())?;
        }
        let [major, minor, feature_patch] = numbers;

        Ok(Self {
            major,
            minor,
            feature: feature_patch / 100,
            patch: feature_patch % 100,
            feature_patch,
            preview_tag,
            raw: raw.to_string(),
        })
    }

    /// `0.0.000`, the lowest possible request
    pub fn zero() -> Self {
        Self {
            major: 0,
            minor: 0,
            feature: 0,
            patch: 0,
            feature_patch: 0,
            preview_tag: None,
            raw: "0.0.000".to_string(),
        }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Feature band (hundreds digit of the third segment)
    pub fn feature(&self) -> u32 {
        self.feature
    }

    pub fn patch(&self) -> u32 {
        self.patch
    }

    pub fn feature_patch(&self) -> u32 {
        self.feature_patch
    }

    pub fn is_prerelease(&self) -> bool {
        self.preview_tag.is_some()
    }

    pub fn preview_tag(&self) -> Option<&str> {
        self.preview_tag.as_deref()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn same_band(&self, other: &SdkVersion) -> bool {
        self.major == other.major && self.minor == other.minor && self.feature == other.feature
    }
}

impl FromStr for SdkVersion {
    type Err = UnparsableVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for SdkVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.feature, self.patch)
            .cmp(&(other.major, other.minor, other.feature, other.patch))
            .then_with(|| match (&self.preview_tag, &other.preview_tag) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()),
            })
    }
}

impl PartialOrd for SdkVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows ordering, so differently cased preview tags compare equal
impl PartialEq for SdkVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SdkVersion {}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for SdkVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
