//! Environment-driven configuration for code workflow behaviour.

use std::time::Duration;

/// Environment variable name for the code TTL, in seconds.
pub const CODE_TTL_SECS_ENV: &str = "CODE_TTL_SECS";

/// Environment variable name for the one-time-use toggle.
pub const CODE_ONE_TIME_USE_ENV: &str = "CODE_ONE_TIME_USE";

/// Environment abstraction for configuration lookups.
///
/// This trait allows testing with mock environments without unsafe env var
/// mutations.
pub trait CodeEnv {
    /// Fetch a string value by name.
    fn string(&self, name: &str) -> Option<String>;
}

/// Environment access backed by the real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCodeEnv;

impl DefaultCodeEnv {
    /// Create a new environment reader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CodeEnv for DefaultCodeEnv {
    fn string(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Configuration for the verification-code workflows.
///
/// Controls how long an issued code stays redeemable and whether a
/// successful redemption consumes it. Leaving a code redeemable until its
/// TTL lapses keeps a live credential behind after a privileged read, so
/// consumption defaults to on and the toggle records the choice explicitly.
///
/// # Example
///
/// ```
/// # use backend::domain::CodeConfig;
/// # use std::time::Duration;
/// let config = CodeConfig::default();
/// assert_eq!(config.ttl(), Duration::from_secs(600));
/// assert!(config.one_time_use());
///
/// let custom = CodeConfig::with_ttl(Duration::from_secs(120)).repeat_use();
/// assert!(!custom.one_time_use());
/// ```
#[derive(Debug, Clone)]
pub struct CodeConfig {
    ttl: Duration,
    one_time_use: bool,
}

impl CodeConfig {
    /// Default TTL in seconds.
    const DEFAULT_TTL_SECS: u64 = 600;

    /// Minimum allowed TTL in seconds.
    ///
    /// Prevents TTLs so short a customer cannot relay the code back to the
    /// agent before it lapses.
    const MIN_TTL_SECS: u64 = 30;

    /// Maximum allowed TTL in seconds (24 hours).
    ///
    /// Prevents codes that outlive the working day they were issued in.
    const MAX_TTL_SECS: u64 = 24 * 3600;

    /// Load configuration from the real process environment.
    ///
    /// Reads `CODE_TTL_SECS` (default: 600, clamped to [30, 86400]) and
    /// `CODE_ONE_TIME_USE` (default: true).
    pub fn from_env() -> Self {
        Self::from_env_with(&DefaultCodeEnv)
    }

    /// Load configuration from a custom environment source.
    ///
    /// Useful for testing without unsafe env var mutations.
    pub fn from_env_with(env: &impl CodeEnv) -> Self {
        let secs = env
            .string(CODE_TTL_SECS_ENV)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_TTL_SECS)
            .clamp(Self::MIN_TTL_SECS, Self::MAX_TTL_SECS);
        let one_time_use = env
            .string(CODE_ONE_TIME_USE_ENV)
            .and_then(|s| parse_bool(&s))
            .unwrap_or(true);
        Self {
            ttl: Duration::from_secs(secs),
            one_time_use,
        }
    }

    /// Create with explicit TTL and default one-time-use semantics.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            one_time_use: true,
        }
    }

    /// Switch to legacy repeat-use semantics: a code stays redeemable until
    /// its TTL lapses.
    pub fn repeat_use(mut self) -> Self {
        self.one_time_use = false;
        self
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether a successful redemption consumes the code.
    pub fn one_time_use(&self) -> bool {
        self.one_time_use
    }
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(Self::DEFAULT_TTL_SECS),
            one_time_use: true,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
