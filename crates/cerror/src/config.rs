//! Stack capture configuration.
//!
//! Read once from the environment on first capture, then frozen.
//!
//! # Environment Variables
//!
//! - `CERROR_CAPTURE=0` - Disable stack capture (accepts "0", "false", "no", "off")
//! - `CERROR_STACK_DEPTH=<n>` - Max frames per snapshot (default 32, clamped to 256, 0 disables)
//!
//! # Usage
//!
//! ```
//! use cerror::config::CaptureConfig;
//!
//! let config = CaptureConfig::from_lookup(|key| match key {
//!     "CERROR_STACK_DEPTH" => Some("8".to_string()),
//!     _ => None,
//! });
//! assert_eq!(config.depth, 8);
//! assert!(config.enabled);
//! ```

use std::str::FromStr;
use std::sync::OnceLock;

pub const ENV_CAPTURE: &str = "CERROR_CAPTURE";
pub const ENV_STACK_DEPTH: &str = "CERROR_STACK_DEPTH";

pub const DEFAULT_STACK_DEPTH: usize = 32;
pub const MAX_STACK_DEPTH: usize = 256;

/// Settings consulted by [`Stack::capture`](crate::Stack::capture).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Whether constructors record a stack at all.
    pub enabled: bool,
    /// Maximum number of frames kept per snapshot.
    pub depth: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            depth: DEFAULT_STACK_DEPTH,
        }
    }
}

impl CaptureConfig {
    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values fall back
    /// to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let depth = lookup_get(&lookup, ENV_STACK_DEPTH, DEFAULT_STACK_DEPTH).min(MAX_STACK_DEPTH);
        let enabled = lookup_get_bool(&lookup, ENV_CAPTURE, true) && depth > 0;
        Self { enabled, depth }
    }
}

/// The process-wide configuration, read from the environment on first use.
pub fn capture_config() -> &'static CaptureConfig {
    static CONFIG: OnceLock<CaptureConfig> = OnceLock::new();
    CONFIG.get_or_init(CaptureConfig::from_env)
}

/// Parse `key` as `T`, or return `default` when unset or unparseable.
fn lookup_get<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Boolean lookup. "1", "true", "yes", "on" are true and "0", "false",
/// "no", "off" are false (case-insensitive). Anything else keeps `default`.
fn lookup_get_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_when_unset() {
        let config = CaptureConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CaptureConfig::default());
        assert_eq!(config.depth, 32);
        assert!(config.enabled);
    }

    #[test]
    fn depth_parsed_and_clamped() {
        let config = CaptureConfig::from_lookup(lookup(&[(ENV_STACK_DEPTH, " 8 ")]));
        assert_eq!(config.depth, 8);

        let config = CaptureConfig::from_lookup(lookup(&[(ENV_STACK_DEPTH, "100000")]));
        assert_eq!(config.depth, MAX_STACK_DEPTH);

        let config = CaptureConfig::from_lookup(lookup(&[(ENV_STACK_DEPTH, "many")]));
        assert_eq!(config.depth, DEFAULT_STACK_DEPTH);
    }

    #[test]
    fn zero_depth_disables() {
        let config = CaptureConfig::from_lookup(lookup(&[(ENV_STACK_DEPTH, "0")]));
        assert!(!config.enabled);
    }

    #[test]
    fn capture_switch() {
        for off in ["0", "false", "No", "OFF"] {
            let config = CaptureConfig::from_lookup(lookup(&[(ENV_CAPTURE, off)]));
            assert!(!config.enabled, "{:?} should disable capture", off);
        }
        let config = CaptureConfig::from_lookup(lookup(&[(ENV_CAPTURE, "maybe")]));
        assert!(config.enabled);
    }
}
