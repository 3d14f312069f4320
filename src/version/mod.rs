//! Version values and the resolvers built on them.

pub mod catalog;
pub mod global_json;
pub mod range;
pub mod roll_forward;
pub mod sdk;
pub mod sdk_version;

pub use catalog::{CachedVersionCatalog, OnDiskVersionCatalog, StaticVersionCatalog, VersionCatalog};
pub use global_json::{parse_global_json, GlobalJson, GLOBAL_JSON_FILE_NAME};
pub use range::{latest, max_satisfying, resolve_runtime_version, verify_runtime_version};
pub use roll_forward::{RollForwardDescriptor, RollForwardPolicy};
pub use sdk::SdkResolver;
pub use sdk_version::{SdkVersion, UnparsableVersion};
