//! Fill strategies for the trailing digits of an identifier.

use crate::{LsuuidError, LsuuidResult};
use std::{fmt, str::FromStr};

/// How the fill digits after the timestamp are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum Mode {
    /// Random bytes from the entropy source.
    #[default]
    Random,
    /// All `0`: the lowest identifier for a prefix and instant.
    Floor,
    /// All `f`: the highest identifier for a prefix and instant.
    Ceil,
}

impl Mode {
    /// Every mode, in the order they are documented.
    pub const ALL: [Mode; 3] = [Mode::Random, Mode::Floor, Mode::Ceil];

    /// Returns the lowercase name used in text and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Random => "random",
            Mode::Floor => "floor",
            Mode::Ceil => "ceil",
        }
    }

    /// Returns true if identifiers in this mode are a pure function of prefix and time.
    pub fn is_deterministic(self) -> bool {
        !matches!(self, Mode::Random)
    }

    /// Parses a mode name, surfacing unrecognised values as [`LsuuidError::UnknownMode`].
    pub fn parse(input: &str) -> LsuuidResult<Self> {
        let name = input.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                tracing::debug!(mode = %input, "rejected unknown mode");
                LsuuidError::UnknownMode {
                    mode: input.to_string(),
                }
            })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = LsuuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::parse(s)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Mode {
    /// Accepts the same names as [`Mode::parse`], reporting others as
    /// [`LsuuidError::UnknownMode`].
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Mode::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_random() {
        assert_eq!(Mode::default(), Mode::Random);
    }

    #[test]
    fn test_parse_known_modes() {
        assert_eq!(Mode::parse("random").unwrap(), Mode::Random);
        assert_eq!(Mode::parse("floor").unwrap(), Mode::Floor);
        assert_eq!(Mode::parse("ceil").unwrap(), Mode::Ceil);
        assert_eq!(" CEIL ".parse::<Mode>().unwrap(), Mode::Ceil);
    }

    #[test]
    fn test_parse_unknown_mode_names_it() {
        let err = Mode::parse("bogus").unwrap_err();
        assert_eq!(
            err,
            LsuuidError::UnknownMode {
                mode: "bogus".into()
            }
        );
        assert_eq!(err.to_string(), "unknown mode [bogus]");
    }

    #[test]
    fn test_display_matches_parse() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_only_random_is_nondeterministic() {
        assert!(!Mode::Random.is_deterministic());
        assert!(Mode::Floor.is_deterministic());
        assert!(Mode::Ceil.is_deterministic());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Mode::Floor).unwrap(), "\"floor\"");
        let mode: Mode = serde_json::from_str("\"ceil\"").unwrap();
        assert_eq!(mode, Mode::Ceil);

        let err = serde_json::from_str::<Mode>("\"bogus\"").unwrap_err();
        assert!(err.to_string().contains("unknown mode [bogus]"));
    }
}
