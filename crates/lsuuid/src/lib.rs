//! Lexically-sortable, time-ordered UUIDs.
//!
//! An LSUUID is a 36-character string in the standard UUID textual layout whose plain string
//! order follows the order in which the identifiers were generated. An optional 24-bit numeric
//! prefix leads the identifier so that callers can partition the ID space (per shard, per
//! tenant) while keeping each partition time-ordered.
//!
//! ## Layout
//!
//! The 32 hex digits behind the dashes are four fields concatenated:
//!
//! | Field       | Width (hex digits)             | Content                                  |
//! |-------------|--------------------------------|------------------------------------------|
//! | prefix      | 6 when supplied, 0 otherwise   | caller prefix, zero padded               |
//! | seconds     | 8                              | Unix epoch seconds, zero padded          |
//! | nanoseconds | 8                              | sub-second nanoseconds, zero padded      |
//! | fill        | `16 - prefix width`            | random bytes, or all `0` / all `f`       |
//!
//! The result is grouped `8-4-4-4-12`, for example
//! `003be468-2b5a-1e1a-8e0e-40c3a1f27d9b`.
//!
//! ## Modes
//!
//! - [`Mode::Random`]: fill with bytes from the entropy source (the default).
//! - [`Mode::Floor`]: fill with `0`, the lowest identifier for a prefix and instant.
//! - [`Mode::Ceil`]: fill with `f`, the highest identifier for a prefix and instant.
//!
//! Floor and ceil identifiers are the range boundaries for scans over sorted identifier
//! storage; see [`LsuuidGenerator::bounds`].
//!
//! ## Example
//!
//! ```
//! use lsuuid::{Lsuuid, Mode, Prefix};
//!
//! # fn main() -> Result<(), lsuuid::LsuuidError> {
//! let id: Lsuuid = lsuuid::generate(Some(Prefix::new(42)?), None, Mode::Random)?;
//! assert_eq!(id.to_string().len(), 36);
//! assert!(id.to_string().starts_with("00002a"));
//! # Ok(())
//! # }
//! ```

mod config;
mod generator;
mod id;
mod mode;
mod prefix;

// Re-export public types
pub use config::{GeneratorConfig, DEFAULT_MODE_ENV, DEFAULT_PREFIX_ENV};
pub use generator::{
    Clock, EntropySource, FixedClock, LsuuidGenerator, OsEntropy, SystemClock, DEFAULT_RAND_LEN,
    PREFIX_LEN, TIMESTAMP_FIELD_LEN,
};
pub use id::{Lsuuid, LsuuidParts};
pub use mode::Mode;
pub use prefix::Prefix;

/// Re-exported for convenience.
pub use ::uuid::Uuid;

use chrono::{DateTime, Utc};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for identifier generation and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LsuuidError {
    /// The prefix was supplied as something other than an integer.
    #[error("expecting integer prefix, got {actual}")]
    InvalidArgument { actual: String },

    /// The prefix integer is outside the 24-bit range.
    #[error(
        "integer prefix out of range. Allowed: min - {min}, max - {max} (hex: {max:x}). Got: {value}."
    )]
    OutOfRange { value: i128, min: u32, max: u32 },

    /// The generation mode is not one of `random`, `floor` or `ceil`.
    #[error("unknown mode [{mode}]")]
    UnknownMode { mode: String },

    /// The reference time cannot be encoded in the 8-digit seconds field.
    #[error("timestamp out of range: {seconds} epoch seconds does not fit 8 hex digits")]
    TimestampOutOfRange { seconds: i64 },

    /// A range query whose lower bound is after its upper bound.
    #[error("invalid range: {from} is after {to}")]
    InvalidRange { from: DateTime<Utc>, to: DateTime<Utc> },

    /// The identifier text is not in canonical LSUUID form.
    #[error("invalid identifier: {0}")]
    InvalidFormat(String),
}

impl LsuuidError {
    /// Returns true if this error was caused by the prefix argument.
    pub fn is_prefix_error(&self) -> bool {
        matches!(
            self,
            LsuuidError::InvalidArgument { .. } | LsuuidError::OutOfRange { .. }
        )
    }

    /// Returns true if this error was caused by an unrecognised mode.
    pub fn is_mode_error(&self) -> bool {
        matches!(self, LsuuidError::UnknownMode { .. })
    }
}

/// Result type for LSUUID operations.
pub type LsuuidResult<T> = Result<T, LsuuidError>;

/// Generates an identifier using the system clock and the operating system's entropy source.
///
/// `reference_time` defaults to now. See [`LsuuidGenerator::generate`] for the full contract.
///
/// # Errors
///
/// Returns [`LsuuidError::TimestampOutOfRange`] if `reference_time` is before the Unix epoch
/// or past the last second representable in 8 hex digits.
pub fn generate(
    prefix: Option<Prefix>,
    reference_time: Option<DateTime<Utc>>,
    mode: Mode,
) -> LsuuidResult<Lsuuid> {
    LsuuidGenerator::new().generate(prefix, reference_time, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_out_of_range_message_reports_bounds() {
        let err = LsuuidError::OutOfRange {
            value: 16_777_216,
            min: 0,
            max: 16_777_215,
        };
        let msg = err.to_string();

        assert!(msg.contains("min - 0"));
        assert!(msg.contains("max - 16777215"));
        assert!(msg.contains("hex: ffffff"));
        assert!(msg.contains("Got: 16777216"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(LsuuidError::InvalidArgument {
            actual: "string \"abc\"".into()
        }
        .is_prefix_error());
        assert!(LsuuidError::UnknownMode {
            mode: "bogus".into()
        }
        .is_mode_error());
        assert!(!LsuuidError::InvalidFormat("x".into()).is_prefix_error());
    }
}
