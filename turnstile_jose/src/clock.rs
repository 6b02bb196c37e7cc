//! Clocks used when checking the time-bound claims of a token

use std::{
    fmt,
    time::{Duration, SystemTime},
};

use serde::{de, Deserialize, Deserializer, Serialize};

/// Seconds elapsed since 1970-01-01T00:00:00Z, as used by the `exp`,
/// `nbf` and `iat` claims
///
/// Deserializes from any non-negative JSON number. A NumericDate may carry
/// fractional seconds; they are dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[derive(Serialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct UnixTime(pub u64);

impl UnixTime {
    /// This time shifted forward, saturating at the end of time
    #[must_use]
    pub fn saturating_add(self, by: Duration) -> Self {
        Self(self.0.saturating_add(by.as_secs()))
    }

    /// This time shifted backward, saturating at the epoch
    #[must_use]
    pub fn saturating_sub(self, by: Duration) -> Self {
        Self(self.0.saturating_sub(by.as_secs()))
    }
}

impl<'de> Deserialize<'de> for UnixTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericDateVisitor)
    }
}

struct NumericDateVisitor;

impl<'de> de::Visitor<'de> for NumericDateVisitor {
    type Value = UnixTime;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative number of seconds since the epoch")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(UnixTime(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(UnixTime)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.is_finite() && v >= 0.0 {
            // `as` saturates at u64::MAX
            Ok(UnixTime(v.floor() as u64))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }
}

impl From<SystemTime> for UnixTime {
    #[inline]
    fn from(t: SystemTime) -> Self {
        // A system clock set before the epoch reads as the epoch
        let secs = t
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Self(secs)
    }
}

/// A source of the current time
pub trait Clock {
    /// The current time according to this clock
    fn now(&self) -> UnixTime;
}

impl<C: Clock + ?Sized> Clock for &'_ C {
    #[inline]
    fn now(&self) -> UnixTime {
        C::now(self)
    }
}

/// The operating system clock
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct System;

impl Clock for System {
    #[inline]
    fn now(&self) -> UnixTime {
        UnixTime::from(SystemTime::now())
    }
}

/// A clock frozen at a given instant, which only moves when told to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TestClock(UnixTime);

impl TestClock {
    /// A clock reading `time`
    #[inline]
    pub const fn new(time: UnixTime) -> Self {
        Self(time)
    }

    /// Moves the clock forward by `secs` seconds
    pub fn advance(&mut self, secs: u64) {
        self.0 = self.0.saturating_add(Duration::from_secs(secs));
    }
}

impl Clock for TestClock {
    #[inline]
    fn now(&self) -> UnixTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_before_epoch_reads_as_epoch() {
        let before = SystemTime::UNIX_EPOCH - Duration::from_secs(30);
        assert_eq!(UnixTime::from(before), UnixTime(0));
    }

    #[test]
    fn test_clock_advances() {
        let mut clock = TestClock::new(UnixTime(100));
        clock.advance(20);
        assert_eq!(clock.now(), UnixTime(120));
    }

    #[test]
    fn shifting_saturates() {
        assert_eq!(UnixTime(5).saturating_sub(Duration::from_secs(10)), UnixTime(0));
        assert_eq!(
            UnixTime(u64::MAX).saturating_add(Duration::from_secs(1)),
            UnixTime(u64::MAX)
        );
    }

    #[test]
    fn serializes_as_bare_seconds() {
        let json = serde_json::to_string(&UnixTime(1_700_000_000)).unwrap();
        assert_eq!(json, "1700000000");
    }

    #[test]
    fn fractional_seconds_are_dropped() {
        let t: UnixTime = serde_json::from_str("1792363171.5").unwrap();
        assert_eq!(t, UnixTime(1_792_363_171));

        let t: UnixTime = serde_json::from_str("1.999").unwrap();
        assert_eq!(t, UnixTime(1));

        let t: UnixTime = serde_json::from_str("1e3").unwrap();
        assert_eq!(t, UnixTime(1000));
    }

    #[test]
    fn negative_or_non_numeric_dates_are_rejected() {
        for json in ["-1", "-0.5", "\"1700000000\"", "null", "true"] {
            assert!(serde_json::from_str::<UnixTime>(json).is_err(), "{json}");
        }
    }
}
