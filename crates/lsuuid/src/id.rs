//! The generated identifier value.

use crate::generator::{PREFIX_LEN, TIMESTAMP_FIELD_LEN};
use crate::{LsuuidError, LsuuidResult, Prefix};
use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Dash offsets of the canonical `8-4-4-4-12` layout.
const DASH_POSITIONS: [usize; 4] = [8, 13, 18, 23];
const CANONICAL_LEN: usize = 36;
const PAYLOAD_LEN: usize = 32;
const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// A lexically-sortable identifier.
///
/// Displayed as 36 lowercase characters, `8-4-4-4-12`. Comparing two `Lsuuid` values gives
/// the same answer as comparing their strings.
///
/// # Parsing
/// [`Lsuuid::parse`] only accepts the canonical lowercase hyphenated form. Uppercase, braced,
/// URN or dash-less input is rejected with [`LsuuidError::InvalidFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lsuuid(Uuid);

/// Fields recovered from an identifier by [`Lsuuid::decode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LsuuidParts {
    pub prefix: Option<Prefix>,
    pub timestamp: DateTime<Utc>,
    /// Trailing fill digits (random, all `0` or all `f`).
    pub fill: String,
}

impl Lsuuid {
    /// Builds an identifier from the 32 concatenated hex digits.
    pub(crate) fn from_payload(payload: &str) -> LsuuidResult<Self> {
        if payload.len() != PAYLOAD_LEN || !is_lower_hex(payload) {
            return Err(LsuuidError::InvalidFormat(format!(
                "payload must be {} lowercase hex digits, got: '{}'",
                PAYLOAD_LEN, payload
            )));
        }
        Uuid::try_parse(payload)
            .map(Self)
            .map_err(|e| LsuuidError::InvalidFormat(e.to_string()))
    }

    /// Validates and parses an identifier in canonical form.
    ///
    /// This does **not** normalise other UUID forms. Callers must provide the lowercase
    /// hyphenated representation the generator emits.
    ///
    /// # Arguments
    ///
    /// * `input` - Identifier text, exactly 36 characters.
    ///
    /// # Returns
    ///
    /// Returns a validated [`Lsuuid`] on success.
    ///
    /// # Errors
    ///
    /// Returns [`LsuuidError::InvalidFormat`] if `input` is not canonical.
    pub fn parse(input: &str) -> LsuuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(LsuuidError::InvalidFormat(format!(
                "identifier must be 36 lowercase characters in 8-4-4-4-12 layout, got: '{}'",
                input
            )));
        }
        Uuid::try_parse(input)
            .map(Self)
            .map_err(|e| LsuuidError::InvalidFormat(e.to_string()))
    }

    /// Returns true if `input` is 36 characters with dashes at 8, 13, 18, 23 and lowercase hex
    /// digits elsewhere.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == CANONICAL_LEN
            && input.bytes().enumerate().all(|(i, b)| {
                if DASH_POSITIONS.contains(&i) {
                    b == b'-'
                } else {
                    matches!(b, b'0'..=b'9' | b'a'..=b'f')
                }
            })
    }

    /// Returns the identifier as a `uuid::Uuid`.
    ///
    /// Useful for storage layers with a native UUID column. Note the value does not carry
    /// RFC 4122 version or variant bits; those positions hold timestamp and fill digits.
    ///
    /// # Returns
    ///
    /// Returns a copy of the inner UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns the 32 hex digits without dashes.
    ///
    /// The payload is the four fields concatenated: prefix (0 or 6 digits), seconds (8),
    /// nanoseconds (8) and fill.
    ///
    /// # Returns
    ///
    /// Returns a 32-character lowercase hex string.
    pub fn payload(&self) -> String {
        self.0.simple().to_string()
    }

    /// Splits the identifier back into prefix, timestamp and fill.
    ///
    /// The layout shifts by six digits without a prefix and the two cases cannot be told
    /// apart from the text alone, so the caller says which one applies.
    ///
    /// # Arguments
    ///
    /// * `prefixed` - Whether the identifier was generated with a prefix.
    ///
    /// # Returns
    ///
    /// Returns the recovered [`LsuuidParts`].
    ///
    /// # Errors
    ///
    /// Returns [`LsuuidError::InvalidFormat`] if the nanosecond field is not a valid
    /// sub-second value.
    pub fn decode(&self, prefixed: bool) -> LsuuidResult<LsuuidParts> {
        let payload = self.payload();

        let (prefix, rest) = if prefixed {
            let (digits, rest) = payload.split_at(PREFIX_LEN);
            (Some(Prefix::from_hex(digits)?), rest)
        } else {
            (None, payload.as_str())
        };

        let (seconds_hex, rest) = rest.split_at(TIMESTAMP_FIELD_LEN);
        let (nanos_hex, fill) = rest.split_at(TIMESTAMP_FIELD_LEN);

        let seconds = parse_field(seconds_hex, "seconds")?;
        let nanos = parse_field(nanos_hex, "nanoseconds")?;
        if nanos >= NANOS_PER_SECOND {
            return Err(LsuuidError::InvalidFormat(format!(
                "nanosecond field {} exceeds one second",
                nanos
            )));
        }

        let timestamp = DateTime::<Utc>::from_timestamp(i64::from(seconds), nanos)
            .ok_or_else(|| {
                LsuuidError::InvalidFormat(format!(
                    "unrepresentable timestamp {}.{}",
                    seconds, nanos
                ))
            })?;

        Ok(LsuuidParts {
            prefix,
            timestamp,
            fill: fill.to_string(),
        })
    }
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn parse_field(digits: &str, name: &str) -> LsuuidResult<u32> {
    u32::from_str_radix(digits, 16).map_err(|e| {
        LsuuidError::InvalidFormat(format!("{} field '{}' is not hex: {}", name, digits, e))
    })
}

impl fmt::Display for Lsuuid {
    /// Formats as lowercase `8-4-4-4-12`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Lsuuid {
    type Err = LsuuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lsuuid::parse(s)
    }
}

impl From<Lsuuid> for Uuid {
    fn from(id: Lsuuid) -> Self {
        id.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Lsuuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Lsuuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Lsuuid::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = "003be465-a000-0012-3456-780000000000";

    #[test]
    fn test_parse_canonical() {
        let id = Lsuuid::parse(SAMPLE).unwrap();
        assert_eq!(id.to_string(), SAMPLE);
        assert_eq!(id.payload(), "003be465a00000123456780000000000");
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        let upper = SAMPLE.to_uppercase();
        assert!(matches!(
            Lsuuid::parse(&upper),
            Err(LsuuidError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_dashes() {
        assert!(Lsuuid::parse("003be465a00000123456780000000000").is_err());
    }

    #[test]
    fn test_parse_rejects_misplaced_dashes() {
        assert!(Lsuuid::parse("003be46-5a000-0012-3456-780000000000").is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(Lsuuid::parse("003be465-a000-0012-3456-78000000000").is_err());
        assert!(Lsuuid::parse("").is_err());
    }

    #[test]
    fn test_is_canonical() {
        assert!(Lsuuid::is_canonical(SAMPLE));
        assert!(Lsuuid::is_canonical("ffffffff-ffff-ffff-ffff-ffffffffffff"));
        assert!(!Lsuuid::is_canonical("{003be465-a000-0012-3456-780000000000}"));
        assert!(!Lsuuid::is_canonical("003be465-a000-0012-3456-78000000000g"));
    }

    #[test]
    fn test_payload_rejects_short_input() {
        assert!(Lsuuid::from_payload("003be465").is_err());
        assert!(Lsuuid::from_payload("003BE465A00000123456780000000000").is_err());
    }

    #[test]
    fn test_decode_with_prefix() {
        let parts = Lsuuid::parse(SAMPLE).unwrap().decode(true).unwrap();

        assert_eq!(parts.prefix, Some(Prefix::new(15_332).unwrap()));
        assert_eq!(
            parts.timestamp,
            Utc.timestamp_opt(0x65a0_0000, 0x1234_5678).unwrap()
        );
        assert_eq!(parts.fill, "0000000000");
    }

    #[test]
    fn test_decode_without_prefix() {
        let parts = Lsuuid::parse("65a00000-1234-5678-ffff-ffffffffffff")
            .unwrap()
            .decode(false)
            .unwrap();

        assert_eq!(parts.prefix, None);
        assert_eq!(
            parts.timestamp,
            Utc.timestamp_opt(0x65a0_0000, 0x1234_5678).unwrap()
        );
        assert_eq!(parts.fill, "ffffffffffffffff");
    }

    #[test]
    fn test_decode_rejects_oversized_nanos() {
        // Nanosecond field 0xffffffff.
        let id = Lsuuid::parse("65a00000-ffff-ffff-0000-000000000000").unwrap();
        assert!(matches!(
            id.decode(false),
            Err(LsuuidError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_ordering_matches_string_ordering() {
        let a = Lsuuid::parse("003be465-a000-0012-3456-780000000000").unwrap();
        let b = Lsuuid::parse("003be465-a000-0012-3456-78ffffffffff").unwrap();
        let c = Lsuuid::parse("003be465-a001-0000-0000-000000000000").unwrap();

        assert!(a < b && b < c);
        assert!(a.to_string() < b.to_string() && b.to_string() < c.to_string());
    }

    #[test]
    fn test_uuid_conversion() {
        let id = Lsuuid::parse(SAMPLE).unwrap();
        let uuid: Uuid = id.into();
        assert_eq!(uuid.hyphenated().to_string(), SAMPLE);
        assert_eq!(id.uuid(), uuid);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_string_form() {
        let id = Lsuuid::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", SAMPLE));

        let back: Lsuuid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<Lsuuid>("\"not-an-id\"").is_err());
    }
}
