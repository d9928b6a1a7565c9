//! The 24-bit partition prefix.

use crate::generator::PREFIX_LEN;
use crate::{LsuuidError, LsuuidResult};
use std::{fmt, str::FromStr};

/// A validated identifier prefix in `[0, 16_777_215]`.
///
/// The prefix occupies the first six hex digits of an identifier. Once constructed the value
/// is guaranteed to fit, so encoding never has to re-check it.
///
/// # Construction
/// - [`Prefix::new`] and the `TryFrom` integer conversions validate the range.
/// - [`FromStr`] accepts decimal (`"15332"`) or `0x`-prefixed hex (`"0x3be4"`) text and
///   rejects anything that is not an integer with [`LsuuidError::InvalidArgument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Prefix(u32);

impl Prefix {
    /// Smallest allowed prefix.
    pub const MIN: u32 = 0;
    /// Largest allowed prefix (`0xffffff`).
    pub const MAX: u32 = 16_777_215;

    /// Creates a prefix from an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns [`LsuuidError::OutOfRange`] if `value` is above [`Prefix::MAX`].
    pub fn new(value: u32) -> LsuuidResult<Self> {
        Self::checked(i128::from(value))
    }

    /// Returns the prefix as an integer.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns the prefix as six lowercase hex digits, left-padded with `0`.
    pub fn to_hex(self) -> String {
        format!("{:0width$x}", self.0, width = PREFIX_LEN)
    }

    /// Parses a prefix out of the leading digits of an identifier payload.
    pub(crate) fn from_hex(digits: &str) -> LsuuidResult<Self> {
        let value = u32::from_str_radix(digits, 16).map_err(|e| {
            LsuuidError::InvalidFormat(format!("prefix digits '{}' are not hex: {}", digits, e))
        })?;
        Self::new(value)
    }

    /// Validates a prefix supplied as an untyped JSON value.
    ///
    /// This is the entry point for callers that receive the prefix from configuration or a
    /// request body and cannot rely on the type system. `null` means "no prefix".
    ///
    /// # Errors
    ///
    /// - [`LsuuidError::InvalidArgument`] naming the JSON type if `value` is not an integer.
    /// - [`LsuuidError::OutOfRange`] if the integer is outside `[0, 16_777_215]`.
    #[cfg(feature = "serde")]
    pub fn from_json(value: &serde_json::Value) -> LsuuidResult<Option<Self>> {
        use serde_json::Value;

        let actual = match value {
            Value::Null => return Ok(None),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Self::checked(i128::from(i)).map(Some);
                }
                if let Some(u) = n.as_u64() {
                    return Self::checked(i128::from(u)).map(Some);
                }
                format!("Float ({})", n)
            }
            Value::Bool(b) => format!("Bool ({})", b),
            Value::String(s) => format!("String ({:?})", s),
            Value::Array(_) => "Array".to_string(),
            Value::Object(_) => "Object".to_string(),
        };

        tracing::debug!(%actual, "rejected non-integer prefix");
        Err(LsuuidError::InvalidArgument { actual })
    }

    fn checked(value: i128) -> LsuuidResult<Self> {
        if value < i128::from(Self::MIN) || value > i128::from(Self::MAX) {
            tracing::debug!(value = %value, "rejected out-of-range prefix");
            return Err(LsuuidError::OutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        // Range checked above.
        Ok(Self(value as u32))
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Prefix {
    type Error = LsuuidError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::checked(i128::from(value))
    }
}

impl TryFrom<u64> for Prefix {
    type Error = LsuuidError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::checked(i128::from(value))
    }
}

impl TryFrom<i32> for Prefix {
    type Error = LsuuidError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::checked(i128::from(value))
    }
}

impl TryFrom<u32> for Prefix {
    type Error = LsuuidError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Prefix> for u32 {
    fn from(prefix: Prefix) -> Self {
        prefix.0
    }
}

impl FromStr for Prefix {
    type Err = LsuuidError;

    /// Parses decimal or `0x`-prefixed hex text.
    ///
    /// Integers too large for any machine type are still reported as
    /// [`LsuuidError::OutOfRange`] rather than as a type error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(digits) => i128::from_str_radix(digits, 16),
            None => trimmed.parse::<i128>(),
        };

        match parsed {
            Ok(value) => Self::checked(value),
            Err(e) if is_overflow(&e) => Err(LsuuidError::OutOfRange {
                value: if trimmed.starts_with('-') {
                    i128::MIN
                } else {
                    i128::MAX
                },
                min: Self::MIN,
                max: Self::MAX,
            }),
            Err(_) => {
                let actual = format!("String ({:?})", s);
                tracing::debug!(%actual, "rejected non-integer prefix");
                Err(LsuuidError::InvalidArgument { actual })
            }
        }
    }
}

fn is_overflow(e: &std::num::ParseIntError) -> bool {
    use std::num::IntErrorKind;
    matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow)
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Prefix {
    /// Deserializes through [`Prefix::from_json`] so strings, floats and booleans report
    /// [`LsuuidError::InvalidArgument`] naming the actual type.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let value = serde_json::Value::deserialize(deserializer)?;
        match Self::from_json(&value).map_err(D::Error::custom)? {
            Some(prefix) => Ok(prefix),
            None => Err(D::Error::custom(LsuuidError::InvalidArgument {
                actual: "Null".to_string(),
            })),
        }
    }
}
