//! Structured logging setup for buildprobe
//!
//! Detection results go to stdout, so every log line is written to stderr. Output is
//! human-readable by default and switches to JSON lines when a build host wants to
//! ingest the diagnostics.
//!
//! # Example
//!
//! ```no_run
//! use buildprobe::util::logging;
//! use tracing::{debug, info};
//!
//! // Reads BUILDPROBE_LOG_LEVEL and BUILDPROBE_LOG_JSON
//! logging::init_from_env();
//!
//! info!("Detection started");
//! debug!(repo = "/src/app", "Probing for project files");
//! ```

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

const LOG_LEVEL_ENV: &str = "BUILDPROBE_LOG_LEVEL";
const LOG_JSON_ENV: &str = "BUILDPROBE_LOG_JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum level for events emitted by this crate
    pub level: Level,

    /// Emit JSON lines instead of the console format
    pub use_json: bool,

    /// Include the module target (e.g. `buildprobe::dotnet::discovery`)
    pub include_target: bool,

    /// Include file and line number
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full metadata, for build hosts that collect logs
    pub fn machine() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }

    fn directive(&self) -> String {
        format!("buildprobe={}", self.level)
    }
}

/// Parses a log level, case-insensitively. Unknown values fall back to `INFO`.
///
/// ```
/// use buildprobe::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("Debug"), Level::DEBUG);
/// assert_eq!(parse_level("verbose"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber. Only the first call has an effect.
///
/// `RUST_LOG` is honored for other targets; the configured level always applies to
/// this crate.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = config.directive().parse() {
            filter = filter.add_directive(directive);
        }

        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        // A subscriber installed by an embedding host wins
        let _ = if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.without_time())
                .try_init()
        };
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from `BUILDPROBE_LOG_LEVEL` and `BUILDPROBE_LOG_JSON`
pub fn init_from_env() {
    init_logging(config_from_env());
}

/// Initializes logging at `level_str`, still honoring `BUILDPROBE_LOG_JSON`
pub fn with_level(level_str: &str) {
    init_logging(LoggingConfig {
        level: parse_level(level_str),
        ..config_from_env()
    });
}

fn config_from_env() -> LoggingConfig {
    let level = env::var(LOG_LEVEL_ENV)
        .map(|v| parse_level(&v))
        .unwrap_or(Level::INFO);

    let use_json = env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.to_lowercase().parse::<bool>().ok())
        .unwrap_or(false);

    if use_json {
        LoggingConfig {
            level,
            ..LoggingConfig::machine()
        }
    } else {
        LoggingConfig::with_level(level)
    }
}
