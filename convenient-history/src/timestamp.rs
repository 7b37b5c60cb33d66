//! File modification timestamps and the tolerance window used to compare them.
//!
//! Timestamps are kept as milliseconds since the Unix epoch. Filesystems
//! disagree on mtime resolution (FAT rounds to two seconds, some network
//! filesystems to one, ext4 keeps nanoseconds), so comparisons that decide
//! whether a recorded output still exists "as built" go through a
//! [`Tolerance`] instead of plain equality.

use filetime::FileTime;
use std::fmt;
use std::fs;
use std::io;
use std::num::ParseIntError;
use std::path::Path;

/// Default half-width of the tolerance window in milliseconds.
pub const FILETIME_EPSILON_MS: i64 = 500;

/// A file modification time in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Timestamp recorded for a source that could not be stat'ed.
    pub const UNKNOWN: Timestamp = Timestamp(0);

    /// Create a timestamp from milliseconds since the epoch.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Milliseconds since the epoch.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Truncate a [`FileTime`] to millisecond precision.
    #[must_use]
    pub fn from_file_time(time: FileTime) -> Self {
        let millis = time
            .unix_seconds()
            .saturating_mul(1000)
            .saturating_add(i64::from(time.nanoseconds() / 1_000_000));
        Self(millis)
    }

    /// Read the modification time of `path`.
    pub fn read(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self::from_file_time(FileTime::from_last_modification_time(
            &metadata,
        )))
    }

    /// Modification time of `path`, or `None` if it does not exist or cannot be stat'ed.
    #[must_use]
    pub fn of(path: &Path) -> Option<Self> {
        Self::read(path).ok()
    }

    /// Lowercase hexadecimal encoding without prefix or padding.
    ///
    /// Negative values are written as their 64-bit two's complement so that
    /// [`Timestamp::from_hex`] reads back the exact same value.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:x}", self.0)
    }

    /// Parse the encoding produced by [`Timestamp::to_hex`].
    pub fn from_hex(text: &str) -> Result<Self, ParseIntError> {
        #[allow(clippy::cast_possible_wrap)]
        u64::from_str_radix(text, 16).map(|bits| Self(bits as i64))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Symmetric window inside which two timestamps count as equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerance {
    epsilon_ms: i64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::from_millis(FILETIME_EPSILON_MS)
    }
}

impl Tolerance {
    /// Tolerance of `epsilon_ms` milliseconds on either side. Negative values are clamped to zero.
    #[must_use]
    pub const fn from_millis(epsilon_ms: i64) -> Self {
        Self {
            epsilon_ms: if epsilon_ms < 0 { 0 } else { epsilon_ms },
        }
    }

    /// Half-width of the window in milliseconds.
    #[must_use]
    pub const fn epsilon_ms(self) -> i64 {
        self.epsilon_ms
    }

    /// `a` lies before `b` by more than the tolerance.
    #[must_use]
    pub fn is_significantly_before(self, a: Timestamp, b: Timestamp) -> bool {
        a.0.saturating_add(self.epsilon_ms) < b.0
    }

    /// `a` lies after `b` by more than the tolerance.
    #[must_use]
    pub fn is_significantly_after(self, a: Timestamp, b: Timestamp) -> bool {
        a.0 > b.0.saturating_add(self.epsilon_ms)
    }

    /// `a` and `b` are equal for staleness purposes.
    #[must_use]
    pub fn within(self, a: Timestamp, b: Timestamp) -> bool {
        !self.is_significantly_before(a, b) && !self.is_significantly_after(a, b)
    }
}
