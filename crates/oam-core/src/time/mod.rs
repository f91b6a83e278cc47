//! A `Duration` newtype that (de)serializes from the same human-friendly strings accepted on the
//! CLI (`"30s"`, `"5m"`, `"1h"`), used throughout [`crate::config::Config`] and step `timeout`
//! fields.

mod serde_impl;

use std::{fmt, str::FromStr, time::Duration as StdDuration};

#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Duration(StdDuration);

impl Duration {
    pub const fn from_secs(secs: u64) -> Self {
        Self(StdDuration::from_secs(secs))
    }

    pub const fn as_std(&self) -> StdDuration {
        self.0
    }
}

impl From<StdDuration> for Duration {
    fn from(value: StdDuration) -> Self {
        Self(value)
    }
}

impl From<Duration> for StdDuration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl FromStr for Duration {
    type Err = humantime::DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(humantime::parse_duration(s)?))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", humantime::format_duration(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_string() {
        let dur: Duration = "30s".parse().unwrap();
        assert_eq!(dur.as_std(), StdDuration::from_secs(30));

        let serialized = serde_json::to_string(&dur).unwrap();
        let deserialized: Duration = serde_json::from_str(&serialized).unwrap();
        assert_eq!(dur, deserialized);
    }
}
