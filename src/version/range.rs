//! "Maximum satisfying version" selection.
//!
//! Unlike [`SdkVersion`](super::SdkVersion), versions here are dot-separated integer
//! sequences of any length. A bare request of `"2"` matches `2.0`, `2.1.3` and so on,
//! while `"2.1"` only matches `2.1.*`.
//!
//! Requests with operators (`^1.2.3`, `~1.2.3`, `>=1.2.3 <2.0.0`, `=1.2.3`, `^1 || ^2`)
//! are evaluated as semver ranges. Space separated comparators must all hold and `||`
//! separates alternatives.

use crate::error::ResolutionError;
use semver::{Version, VersionReq};
use std::cmp::Ordering;
use tracing::{debug, error, warn};

fn segments(version: &str) -> Option<Vec<u64>> {
    version
        .trim()
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

/// Parses a requested prefix. Trailing wildcards (`2.x`, `2.*`) are dropped.
fn requested_segments(requested: &str) -> Option<Vec<u64>> {
    let mut parts: Vec<&str> = requested.trim().split('.').collect();
    while parts.len() > 1 && matches!(parts.last(), Some(&("x" | "X" | "*"))) {
        parts.pop();
    }
    parts.iter().map(|part| part.parse::<u64>().ok()).collect()
}

fn compare_padded(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn matches_prefix(prefix: &[u64], candidate: &[u64]) -> bool {
    prefix
        .iter()
        .enumerate()
        .all(|(i, want)| candidate.get(i).copied().unwrap_or(0) == *want)
}

fn is_range_syntax(requested: &str) -> bool {
    requested.contains(|c: char| {
        matches!(c, '^' | '~' | '<' | '>' | '=' | '|' | ',') || c.is_whitespace()
    })
}

fn is_operator(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| matches!(c, '^' | '~' | '<' | '>' | '='))
}

/// One `VersionReq` per `||` alternative. Bare comparators mean an exact match, and an
/// operator separated from its version by a space still applies to it.
fn parse_range(requested: &str) -> Option<Vec<VersionReq>> {
    requested
        .split("||")
        .map(|alternative| {
            let mut comparators = Vec::new();
            let mut operator = String::new();
            for token in alternative.split_whitespace() {
                let token = token.trim_end_matches(',');
                if token.is_empty() {
                    continue;
                }
                if is_operator(token) {
                    operator.push_str(token);
                    continue;
                }

                let version = token.trim_start_matches(|c: char| c == 'v' || c == 'V');
                if version.is_empty() {
                    return None;
                }
                let has_operator = !operator.is_empty()
                    || version.starts_with(|c: char| matches!(c, '^' | '~' | '<' | '>' | '='));
                let wildcard = version.contains(|c: char| matches!(c, '*' | 'x' | 'X'));
                if !has_operator && !wildcard {
                    operator.push('=');
                }
                comparators.push(format!("{}{}", operator, version));
                operator.clear();
            }

            if comparators.is_empty() {
                return None;
            }
            VersionReq::parse(&comparators.join(", ")).ok()
        })
        .collect()
}

/// Parses a catalog entry as semver, padding `16` and `10.12` out to three segments.
fn semver_of(entry: &str) -> Option<Version> {
    let entry = entry.trim();
    let split = entry.find(|c: char| c == '-' || c == '+').unwrap_or(entry.len());
    let (core, rest) = entry.split_at(split);
    let padding = match core.split('.').count() {
        1 => ".0.0",
        2 => ".0",
        _ => "",
    };
    Version::parse(&format!("{}{}{}", core, padding, rest)).ok()
}

fn max_satisfying_range<I, S>(requested: &str, available: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Some(alternatives) = parse_range(requested) else {
        debug!(requested, "Requested version range is malformed");
        return None;
    };

    let mut best: Option<(Version, String)> = None;
    for entry in available {
        let entry = entry.as_ref();
        let Some(version) = semver_of(entry) else {
            continue;
        };
        if !alternatives.iter().any(|req| req.matches(&version)) {
            continue;
        }
        if best.as_ref().map_or(true, |(current, _)| version > *current) {
            best = Some((version, entry.to_string()));
        }
    }

    best.map(|(_, raw)| raw)
}

/// Returns the greatest entry of `available` satisfying `requested`.
///
/// A bare numeric request (optionally `v`-prefixed) matches entries whose leading
/// segments equal it. Missing candidate segments count as `0`, so `2.1.0` matches `2.1`.
/// Entries that are not dot-separated integers are skipped. When two matches compare
/// equal numerically (`2.1` and `2.1.0`) either may be returned.
///
/// Any other request is a semver range. Prerelease entries only satisfy a range whose
/// comparator names the same `major.minor.patch` with a prerelease.
pub fn max_satisfying<I, S>(requested: &str, available: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let requested = requested.trim();
    let requested = requested
        .strip_prefix(|c: char| c == 'v' || c == 'V')
        .unwrap_or(requested);
    if is_range_syntax(requested) {
        return max_satisfying_range(requested, available);
    }

    let Some(prefix) = requested_segments(requested) else {
        debug!(requested, "Requested version is not a numeric prefix");
        return None;
    };

    let mut best: Option<(Vec<u64>, String)> = None;
    for entry in available {
        let entry = entry.as_ref();
        let Some(parsed) = segments(entry) else {
            continue;
        };
        if !matches_prefix(&prefix, &parsed) {
            continue;
        }
        let better = match &best {
            Some((current, _)) => compare_padded(&parsed, current) == Ordering::Greater,
            None => true,
        };
        if better {
            best = Some((parsed, entry.to_string()));
        }
    }

    best.map(|(_, raw)| raw)
}

/// Greatest numeric version in `available`, ignoring unparsable entries
pub fn latest<I, S>(available: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    available
        .into_iter()
        .filter_map(|entry| {
            let entry = entry.as_ref();
            segments(entry).map(|parsed| (parsed, entry.to_string()))
        })
        .max_by(|(a, _), (b, _)| compare_padded(a, b))
        .map(|(_, raw)| raw)
}

/// Matches a runtime version against a catalog.
///
/// Final releases are tried first with a prefix match. When none matches, prerelease
/// entries (containing `-`) whose raw text starts with `requested` are considered and
/// the greatest one by string order wins.
pub fn resolve_runtime_version(requested: &str, available: &[String]) -> Option<String> {
    let releases = available.iter().filter(|v| !v.contains('-'));
    if let Some(found) = max_satisfying(requested, releases) {
        return Some(found);
    }

    let found = available
        .iter()
        .filter(|v| v.contains('-') && v.starts_with(requested))
        .max()
        .cloned();

    if let Some(preview) = &found {
        debug!(requested, resolved = %preview, "Resolved runtime version to a prerelease");
    }
    found
}

/// Like [`resolve_runtime_version`], but failing with the complete catalog when nothing matches.
pub fn verify_runtime_version(
    platform: &str,
    requested: &str,
    supported: &[String],
) -> Result<String, ResolutionError> {
    if supported.iter().any(|v| segments(v).is_none() && !v.contains('-')) {
        warn!(platform, "Supported version catalog contains unparsable entries");
    }

    resolve_runtime_version(requested, supported).ok_or_else(|| {
        error!(
            platform,
            requested,
            supported = ?supported,
            "Requested version is not supported"
        );
        ResolutionError::UnsupportedVersion {
            platform: platform.to_string(),
            requested: requested.to_string(),
            available: supported.to_vec(),
        }
    })
}
