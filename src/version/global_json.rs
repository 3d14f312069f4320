//! Reader for the project-local `global.json` SDK descriptor.
//!
//! Only the `sdk` section matters: `version`, `rollForward` and `allowPrerelease`.
//! Keys and policy names are matched case-insensitively and trailing commas are tolerated.

use super::roll_forward::{RollForwardDescriptor, RollForwardPolicy};
use super::sdk_version::SdkVersion;
use crate::error::ResolutionError;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const GLOBAL_JSON_FILE_NAME: &str = "global.json";

/// Outcome of reading a descriptor.
///
/// An unrecognized `rollForward` value is not a parse error: it makes resolution fail
/// softly with `None`, so it is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalJson {
    Descriptor(RollForwardDescriptor),
    UnknownPolicy { requested: SdkVersion, policy: String },
}

/// Matches a string literal or a comma before a closing bracket. Strings are matched
/// whole so that `,}` inside a value is never taken for a trailing comma.
fn trailing_comma() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""(?:[^"\\]|\\.)*"|,(\s*[}\]])"#).expect("valid regex"))
}

fn strip_trailing_commas(content: &str) -> Cow<'_, str> {
    trailing_comma().replace_all(content, |caps: &Captures| match caps.get(1) {
        Some(closing) => closing.as_str().to_string(),
        None => caps[0].to_string(),
    })
}

fn get_ci<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().to_ascii_lowercase().parse::<bool>().ok(),
        _ => None,
    }
}

/// Parses descriptor content.
///
/// A missing `sdk` section yields the default descriptor (`0.0.000`, `latestMajor`).
/// With an `sdk` section, a missing version means `0.0.000` and a missing policy means
/// `latestPatch` when a version was given, else `latestMajor`.
pub fn parse_global_json(content: &str) -> Result<GlobalJson, ResolutionError> {
    let cleaned = strip_trailing_commas(content);
    let root: Value = serde_json::from_str(&cleaned)
        .map_err(|e| ResolutionError::MalformedDescriptor(format!("invalid JSON: {}", e)))?;

    let Some(root) = root.as_object() else {
        return Err(ResolutionError::MalformedDescriptor(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    let sdk = match get_ci(root, "sdk") {
        Some(Value::Object(sdk)) => sdk,
        Some(Value::Null) | None => {
            debug!("No 'sdk' section in global.json, using the default roll-forward policy");
            return Ok(GlobalJson::Descriptor(RollForwardDescriptor::default()));
        }
        Some(other) => {
            return Err(ResolutionError::MalformedDescriptor(format!(
                "'sdk' must be an object, found {}",
                other
            )))
        }
    };

    let version = match get_ci(sdk, "version") {
        Some(Value::String(raw)) => Some(SdkVersion::parse(raw.trim()).map_err(|e| {
            ResolutionError::MalformedDescriptor(format!("invalid 'sdk.version': {}", e))
        })?),
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(ResolutionError::MalformedDescriptor(format!(
                "'sdk.version' must be a string, found {}",
                other
            )))
        }
    };

    let allow_prerelease = get_ci(sdk, "allowPrerelease").and_then(as_bool);

    let default_policy = if version.is_some() {
        RollForwardPolicy::LatestPatch
    } else {
        RollForwardPolicy::LatestMajor
    };
    let requested = version.unwrap_or_else(SdkVersion::zero);

    let policy = match get_ci(sdk, "rollForward").and_then(Value::as_str) {
        Some(name) => match name.parse::<RollForwardPolicy>() {
            Ok(policy) => policy,
            Err(e) => {
                warn!(error = %e, "Unrecognized rollForward policy in global.json");
                return Ok(GlobalJson::UnknownPolicy {
                    requested,
                    policy: name.to_string(),
                });
            }
        },
        None => default_policy,
    };

    Ok(GlobalJson::Descriptor(RollForwardDescriptor {
        requested,
        policy,
        allow_prerelease,
    }))
}
