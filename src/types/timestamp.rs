use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
    time::{Duration, SystemTime},
};

use humantime::DurationError;
use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error parsing a [`TimeDiff`].
#[derive(Debug, Error)]
pub enum TimeDiffParseError {
    /// Not a duration `humantime` understands.
    #[error(transparent)]
    Invalid(#[from] DurationError),
    /// More milliseconds than fit into a `u64`.
    #[error("duration '{0}' is too large")]
    TooLarge(String),
}

/// A moment in time, as milliseconds since the Unix epoch.
///
/// Serializes as a bare integer, which is what the deploy header carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Returns the timestamp of the current moment.
    pub fn now() -> Self {
        let millis = SystemTime::UNIX_EPOCH
            .elapsed()
            .unwrap_or_default()
            .as_millis();
        Timestamp(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    /// Returns the timestamp as the number of milliseconds since the Unix epoch
    pub fn millis(&self) -> u64 {
        self.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let system_time = SystemTime::UNIX_EPOCH + Duration::from_millis(self.0);
        write!(f, "{}", humantime::format_rfc3339_millis(system_time))
    }
}

impl From<u64> for Timestamp {
    fn from(milliseconds_since_epoch: u64) -> Timestamp {
        Timestamp(milliseconds_since_epoch)
    }
}

/// A human-readable time difference, such as a deploy's time-to-live.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeDiff(u64);

impl TimeDiff {
    /// Creates a new time difference from seconds.
    pub const fn from_seconds(seconds: u32) -> Self {
        TimeDiff(seconds as u64 * 1_000)
    }

    /// Returns the time difference in milliseconds.
    pub fn millis(&self) -> u64 {
        self.0
    }
}

impl Display for TimeDiff {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", humantime::format_duration(Duration::from(*self)))
    }
}

impl FromStr for TimeDiff {
    type Err = TimeDiffParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let millis = humantime::parse_duration(value)?.as_millis();
        u64::try_from(millis)
            .map(TimeDiff)
            .map_err(|_| TimeDiffParseError::TooLarge(value.to_string()))
    }
}

impl From<TimeDiff> for Duration {
    fn from(diff: TimeDiff) -> Duration {
        Duration::from_millis(diff.0)
    }
}

impl Serialize for TimeDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TimeDiff {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value_as_string = String::deserialize(deserializer)?;
        TimeDiff::from_str(&value_as_string).map_err(SerdeError::custom)
    }
}
