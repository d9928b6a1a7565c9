//! Identifier generation.
//!
//! [`LsuuidGenerator`] packs prefix, timestamp and fill into the 32-digit payload. It holds no
//! mutable state: the clock and the entropy source are injected so tests can pin both.

use crate::{Lsuuid, LsuuidError, LsuuidResult, Mode, Prefix};
use chrono::{DateTime, Utc};
use rand::RngCore;

/// Width of the prefix field when a prefix is supplied.
pub const PREFIX_LEN: usize = 6;
/// Width of each of the seconds and nanoseconds fields.
pub const TIMESTAMP_FIELD_LEN: usize = 8;
/// Width of the fill field before the prefix width is subtracted.
pub const DEFAULT_RAND_LEN: usize = 16;

const FLOOR_CHAR: char = '0';
const CEIL_CHAR: char = 'f';

/// Largest epoch second representable in the seconds field.
const MAX_SECONDS: i64 = 0xffff_ffff;
/// Largest value written to the nanoseconds field.
const MAX_NANOS: u32 = 999_999_999;

/// Source of the reference time used when the caller supplies none.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of the random bytes used in [`Mode::Random`].
pub trait EntropySource: Send + Sync {
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Wall clock time from the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always reports the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Cryptographically strong bytes from the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) {
        rand::rngs::OsRng.fill_bytes(dest);
    }
}

/// Generates lexically-sortable identifiers.
///
/// Cloning is cheap and a generator can be shared across threads whenever its clock and
/// entropy source can.
#[derive(Clone, Debug, Default)]
pub struct LsuuidGenerator<C = SystemClock, E = OsEntropy> {
    clock: C,
    entropy: E,
}

impl LsuuidGenerator {
    /// Creates a generator backed by the system clock and the OS entropy source.
    ///
    /// This is what production callers want; the identifiers it produces are stamped with
    /// wall clock time and filled with cryptographically strong bytes in [`Mode::Random`].
    ///
    /// # Returns
    ///
    /// Returns a `LsuuidGenerator<SystemClock, OsEntropy>`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock, E: EntropySource> LsuuidGenerator<C, E> {
    /// Creates a generator with explicit time and randomness sources.
    ///
    /// Use this to pin the clock or the entropy in tests, or to plug in a different
    /// platform source.
    ///
    /// # Arguments
    ///
    /// * `clock` - Supplies the reference time when the caller passes none.
    /// * `entropy` - Supplies the fill bytes in [`Mode::Random`]. It is not touched in the
    ///   deterministic modes.
    ///
    /// # Returns
    ///
    /// Returns a generator that owns both sources.
    pub fn with_sources(clock: C, entropy: E) -> Self {
        Self { clock, entropy }
    }

    /// Generates an identifier.
    ///
    /// Without a prefix the fill widens to 16 digits, so the output is 36 characters either
    /// way.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Optional partition prefix placed in the first six hex digits.
    /// * `reference_time` - Time encoded in the identifier. Defaults to the generator's clock.
    /// * `mode` - How the trailing fill digits are produced.
    ///
    /// # Returns
    ///
    /// Returns the identifier as an [`Lsuuid`].
    ///
    /// # Errors
    ///
    /// Returns [`LsuuidError::TimestampOutOfRange`] if the reference time is before the Unix
    /// epoch or after `0xffffffff` epoch seconds.
    pub fn generate(
        &self,
        prefix: Option<Prefix>,
        reference_time: Option<DateTime<Utc>>,
        mode: Mode,
    ) -> LsuuidResult<Lsuuid> {
        let time = reference_time.unwrap_or_else(|| self.clock.now());
        self.generate_at(prefix, time, mode)
    }

    /// Generates an identifier stamped with the clock's current time.
    ///
    /// Equivalent to [`LsuuidGenerator::generate`] with `reference_time` of `None`.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Optional partition prefix.
    /// * `mode` - How the trailing fill digits are produced.
    ///
    /// # Errors
    ///
    /// Returns [`LsuuidError::TimestampOutOfRange`] if the clock reports a time the seconds
    /// field cannot hold.
    pub fn generate_now(&self, prefix: Option<Prefix>, mode: Mode) -> LsuuidResult<Lsuuid> {
        self.generate_at(prefix, self.clock.now(), mode)
    }

    /// Generates an identifier for an explicit reference time.
    ///
    /// The clock is not consulted. Floor and ceil identifiers from this method are a pure
    /// function of `prefix` and `time`.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Optional partition prefix.
    /// * `time` - Time encoded in the seconds and nanoseconds fields. Leap-second nanoseconds
    ///   are pinned to 999_999_999.
    /// * `mode` - How the trailing fill digits are produced.
    ///
    /// # Errors
    ///
    /// Returns [`LsuuidError::TimestampOutOfRange`] if `time` is before the Unix epoch or after
    /// `0xffffffff` epoch seconds.
    pub fn generate_at(
        &self,
        prefix: Option<Prefix>,
        time: DateTime<Utc>,
        mode: Mode,
    ) -> LsuuidResult<Lsuuid> {
        let prefix_hex = prefix.map(Prefix::to_hex).unwrap_or_default();
        let (seconds_hex, nanos_hex) = timestamp_hex(time)?;
        let fill_len = DEFAULT_RAND_LEN - prefix_hex.len();

        let mut payload = String::with_capacity(32);
        payload.push_str(&prefix_hex);
        payload.push_str(&seconds_hex);
        payload.push_str(&nanos_hex);
        payload.push_str(&self.fill_hex(mode, fill_len));

        let id = Lsuuid::from_payload(&payload)?;
        tracing::trace!(%id, %mode, "generated identifier");
        Ok(id)
    }

    /// Returns the lowest identifier at `from` and the highest at `to` for a prefix.
    ///
    /// Every identifier generated with the same prefix in `[from, to]` sorts between the two.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix the range is scoped to. `None` scans unprefixed identifiers.
    /// * `from` - Inclusive start of the range.
    /// * `to` - Inclusive end of the range.
    ///
    /// # Returns
    ///
    /// Returns `(lower, upper)`: the floor identifier at `from` and the ceil identifier at `to`.
    ///
    /// # Errors
    ///
    /// Returns [`LsuuidError::InvalidRange`] if `from` is after `to`, or
    /// [`LsuuidError::TimestampOutOfRange`] if either end cannot be encoded.
    pub fn bounds(
        &self,
        prefix: Option<Prefix>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LsuuidResult<(Lsuuid, Lsuuid)> {
        if from > to {
            return Err(LsuuidError::InvalidRange { from, to });
        }
        let lower = self.generate_at(prefix, from, Mode::Floor)?;
        let upper = self.generate_at(prefix, to, Mode::Ceil)?;
        Ok((lower, upper))
    }

    fn fill_hex(&self, mode: Mode, fill_len: usize) -> String {
        match mode {
            Mode::Random => {
                // Byte count rounds down; fill_len is 10 or 16 so this never drops a digit.
                let mut bytes = vec![0u8; fill_len / 2];
                self.entropy.fill_bytes(&mut bytes);
                hex::encode(bytes)
            }
            Mode::Ceil => repeat_char(CEIL_CHAR, fill_len),
            Mode::Floor => repeat_char(FLOOR_CHAR, fill_len),
        }
    }
}

/// Renders `value` as lowercase hex, left-padded with `0` to `width` digits.
pub(crate) fn padded_hex(value: u64, width: usize) -> String {
    format!("{:0width$x}", value, width = width)
}

fn repeat_char(c: char, len: usize) -> String {
    c.to_string().repeat(len)
}

fn timestamp_hex(time: DateTime<Utc>) -> LsuuidResult<(String, String)> {
    let seconds = time.timestamp();
    if !(0..=MAX_SECONDS).contains(&seconds) {
        tracing::debug!(seconds, "rejected reference time outside the seconds field");
        return Err(LsuuidError::TimestampOutOfRange { seconds });
    }
    // Leap seconds report up to 1_999_999_999; pin them to the last nanosecond of the second.
    let nanos = time.timestamp_subsec_nanos().min(MAX_NANOS);

    Ok((
        padded_hex(seconds as u64, TIMESTAMP_FIELD_LEN),
        padded_hex(u64::from(nanos), TIMESTAMP_FIELD_LEN),
    ))
}
