//! Generator configuration.
//!
//! Defaults for prefix and mode are resolved once at process startup and then passed to the
//! code that generates identifiers. Generation itself never reads environment variables.

use crate::{LsuuidResult, Mode, Prefix};

/// Environment variable holding the default prefix.
pub const DEFAULT_PREFIX_ENV: &str = "LSUUID_DEFAULT_PREFIX";
/// Environment variable holding the default mode.
pub const DEFAULT_MODE_ENV: &str = "LSUUID_DEFAULT_MODE";

/// Defaults applied when a caller does not choose a prefix or mode explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    default_prefix: Option<Prefix>,
    default_mode: Mode,
}

impl GeneratorConfig {
    pub fn new(default_prefix: Option<Prefix>, default_mode: Mode) -> Self {
        Self {
            default_prefix,
            default_mode,
        }
    }

    /// Builds a config from optional raw values, typically read from the environment.
    ///
    /// `None`, empty and whitespace-only values leave the built-in default in place.
    ///
    /// # Errors
    ///
    /// Propagates the prefix and mode parse errors for values that are set but invalid.
    pub fn from_env_values(prefix: Option<String>, mode: Option<String>) -> LsuuidResult<Self> {
        let default_prefix = non_empty(prefix)
            .map(|v| v.parse::<Prefix>())
            .transpose()?;
        let default_mode = non_empty(mode)
            .map(|v| v.parse::<Mode>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self::new(default_prefix, default_mode))
    }

    pub fn default_prefix(&self) -> Option<Prefix> {
        self.default_prefix
    }

    pub fn default_mode(&self) -> Mode {
        self.default_mode
    }

    /// Returns `explicit` if set, otherwise the configured default prefix.
    pub fn resolve_prefix(&self, explicit: Option<Prefix>) -> Option<Prefix> {
        explicit.or(self.default_prefix)
    }

    /// Returns `explicit` if set, otherwise the configured default mode.
    pub fn resolve_mode(&self, explicit: Option<Mode>) -> Mode {
        explicit.unwrap_or(self.default_mode)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
